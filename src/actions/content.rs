// Candidate content picked out of the extractor's JSON, and the shape-only
// validators that gate every remote call.
//
// Validators never perform I/O. A rejecting validator makes the handler
// answer with a guidance message instead of guessing missing values.

use serde_json::Value;

use crate::github::types::MergeMethod;

/// Token prefix a merge credential must carry.
pub const MERGE_TOKEN_PREFIX: &str = "gho_";

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}

fn integer_field(value: &Value, key: &str) -> Option<i64> {
    value.get(key)?.as_i64()
}

/// Amounts arrive as a JSON number or a decimal string; both are kept as the
/// original decimal text.
fn amount_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    let trimmed = text?.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn owner_repo_shaped(repository: &str) -> bool {
    let segments: Vec<&str> = repository.split('/').collect();
    matches!(segments.as_slice(), [owner, repo] if !owner.is_empty() && !repo.is_empty())
}

/// Loosely-typed merge candidate, straight from extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergePrCandidate {
    pub repository: Option<String>,
    pub pull_number: Option<i64>,
    pub merge_method: Option<String>,
    pub commit_message: Option<String>,
    pub access_token: Option<String>,
    pub reward_amount: Option<String>,
}

/// Merge request after validation. Downstream steps assume nothing beyond
/// what these fields guarantee.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMerge {
    pub repository: String,
    pub pull_number: u64,
    pub merge_method: MergeMethod,
    pub commit_message: Option<String>,
    pub access_token: String,
    pub reward_amount: Option<String>,
}

impl MergePrCandidate {
    pub fn from_value(value: &Value) -> Self {
        Self {
            repository: string_field(value, "repository"),
            pull_number: integer_field(value, "pullNumber"),
            merge_method: string_field(value, "mergeMethod"),
            commit_message: string_field(value, "commitMessage"),
            access_token: string_field(value, "accessToken"),
            reward_amount: amount_field(value, "rewardAmount"),
        }
    }

    pub fn validate(&self) -> Option<ValidatedMerge> {
        let repository = non_blank(self.repository.as_deref())?;
        if !owner_repo_shaped(repository) {
            return None;
        }
        let pull_number = self.pull_number?;
        if pull_number <= 0 {
            return None;
        }
        let access_token = non_blank(self.access_token.as_deref())?;
        if !access_token.starts_with(MERGE_TOKEN_PREFIX) {
            return None;
        }
        let merge_method = self
            .merge_method
            .as_deref()
            .and_then(MergeMethod::parse)
            .unwrap_or_default();

        Some(ValidatedMerge {
            repository: repository.to_string(),
            pull_number: pull_number as u64,
            merge_method,
            commit_message: non_blank(self.commit_message.as_deref()).map(str::to_string),
            access_token: access_token.to_string(),
            reward_amount: non_blank(self.reward_amount.as_deref()).map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueCandidate {
    pub repository: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub labels: Option<Vec<String>>,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedIssue {
    pub repository: String,
    pub title: String,
    pub body: String,
    pub labels: Option<Vec<String>>,
    pub access_token: Option<String>,
}

impl IssueCandidate {
    pub fn from_value(value: &Value) -> Self {
        let labels = value.get("labels").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        });
        Self {
            repository: string_field(value, "repository"),
            title: string_field(value, "title"),
            body: string_field(value, "body"),
            labels,
            access_token: string_field(value, "accessToken"),
        }
    }

    pub fn validate(&self) -> Option<ValidatedIssue> {
        let repository = non_blank(self.repository.as_deref())?;
        if !owner_repo_shaped(repository) {
            return None;
        }
        let title = non_blank(self.title.as_deref())?;
        let body = non_blank(self.body.as_deref())?;

        Some(ValidatedIssue {
            repository: repository.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            labels: self.labels.clone().filter(|labels| !labels.is_empty()),
            access_token: non_blank(self.access_token.as_deref()).map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentCandidate {
    pub repository: Option<String>,
    pub pull_number: Option<i64>,
    pub comment: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedComment {
    pub repository: String,
    pub pull_number: u64,
    pub comment: String,
    pub access_token: Option<String>,
}

impl CommentCandidate {
    pub fn from_value(value: &Value) -> Self {
        Self {
            repository: string_field(value, "repository"),
            pull_number: integer_field(value, "pullNumber"),
            comment: string_field(value, "comment"),
            access_token: string_field(value, "accessToken"),
        }
    }

    pub fn validate(&self) -> Option<ValidatedComment> {
        let repository = non_blank(self.repository.as_deref())?;
        if !owner_repo_shaped(repository) {
            return None;
        }
        let pull_number = self.pull_number?;
        if pull_number <= 0 {
            return None;
        }
        let comment = non_blank(self.comment.as_deref())?;

        Some(ValidatedComment {
            repository: repository.to_string(),
            pull_number: pull_number as u64,
            comment: comment.to_string(),
            access_token: non_blank(self.access_token.as_deref()).map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPullsCandidate {
    pub repository: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedListPulls {
    pub repository: String,
    pub access_token: Option<String>,
}

impl ListPullsCandidate {
    pub fn from_value(value: &Value) -> Self {
        Self {
            repository: string_field(value, "repository"),
            access_token: string_field(value, "accessToken"),
        }
    }

    pub fn validate(&self) -> Option<ValidatedListPulls> {
        let repository = non_blank(self.repository.as_deref())?;
        if !owner_repo_shaped(repository) {
            return None;
        }
        Some(ValidatedListPulls {
            repository: repository.to_string(),
            access_token: non_blank(self.access_token.as_deref()).map(str::to_string),
        })
    }
}
