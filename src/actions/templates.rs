// Task templates handed to the intent extractor, one per action kind.
//
// Each template names the fields to extract and carries a
// `{{recentMessages}}` slot for the rendered conversation context.

pub const MERGE_PR: &str = r#"Respond with a JSON markdown block containing only the extracted values. Use null for any values that cannot be determined.

Example response:
```json
{
    "repository": "owner/repo",
    "pullNumber": 123,
    "mergeMethod": "merge",
    "commitMessage": "Merge pull request #123: Feature implementation",
    "accessToken": "gho_exampleTokenValue",
    "rewardAmount": 10
}
```

{{recentMessages}}

Given the recent messages, extract the following information about the GitHub pull request merge:
- Repository (in the format owner/repo)
- Pull request number
- Merge method (merge, squash, or rebase) if specified
- Custom commit message if provided
- Github access token
- Optional reward amount

Respond with a JSON markdown block containing only the extracted values."#;

pub const CREATE_ISSUE: &str = r#"Respond with a JSON markdown block containing only the extracted values. Use null for any values that cannot be determined.

Example response:
```json
{
    "repository": "owner/repo",
    "title": "Issue Title",
    "body": "Issue Description",
    "labels": ["bug", "urgent"],
    "accessToken": "gho_exampleTokenValue"
}
```

{{recentMessages}}

Given the recent messages, extract the following information about the requested GitHub issue:
- Repository (in the format owner/repo)
- Issue title
- Issue body
- Labels (optional)
- Github access token

Respond with a JSON markdown block containing only the extracted values."#;

pub const PR_COMMENT: &str = r#"Respond with a JSON markdown block containing only the extracted values. Use null for any values that cannot be determined.

Example response:
```json
{
    "repository": "owner/repo",
    "pullNumber": 123,
    "comment": "Great work! Just a few minor suggestions...",
    "accessToken": "gho_exampleTokenValue"
}
```

{{recentMessages}}

Given the recent messages, extract the following information about the GitHub pull request comment:
- Repository (in the format owner/repo)
- Pull request number
- Comment text
- Github access token

Respond with a JSON markdown block containing only the extracted values."#;

pub const LIST_PRS: &str = r#"Respond with a JSON markdown block containing only the extracted values. Use null for any values that cannot be determined.

Example response:
```json
{
    "repository": "owner/repo",
    "accessToken": "gho_exampleTokenValue"
}
```

{{recentMessages}}

Given the recent messages, extract the following information about the GitHub pull request:
- Repository (in the format owner/repo)
- Github access token

Respond with a JSON markdown block containing only the extracted values."#;
