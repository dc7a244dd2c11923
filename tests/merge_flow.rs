// End-to-end merge orchestration scenarios over recording fakes.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use mergetip::actions::merge::INSUFFICIENT_MERGE_INFO;
use mergetip::actions::{ActionRouter, MergeOrchestrator, MergePhase, UNRECOGNIZED_REQUEST};
use mergetip::extractor::{ExtractionError, IntentExtractor};
use mergetip::github::{
    GatewayBuilder, GitHubError, MergeMethod, MergeOutcome, MergeabilityResult,
    PullRequestSummary, RepoOps,
};
use mergetip::message::{ActionRequest, ConversationContext, Speaker};

const PR_BODY: &str =
    "pay me at 0x044015e4766d36f6d31458fed9f292c3afafd08f1991b1f58f5a14826d7fa22a";
const WALLET: &str = "0x044015e4766d36f6d31458fed9f292c3afafd08f1991b1f58f5a14826d7fa22a";

#[derive(Debug, Clone, PartialEq)]
enum RecordedOp {
    CheckMergeability {
        pr: u64,
    },
    Merge {
        pr: u64,
        method: MergeMethod,
        commit_message: String,
    },
    CreateIssue {
        title: String,
    },
    CreatePrComment {
        pr: u64,
    },
    ListOpenPullRequests,
}

struct ScriptedGateway {
    ops: Arc<Mutex<Vec<RecordedOp>>>,
    mergeability: MergeabilityResult,
    fail_merge: bool,
}

#[async_trait]
impl RepoOps for ScriptedGateway {
    async fn check_mergeability(
        &self,
        pr_number: u64,
    ) -> Result<MergeabilityResult, GitHubError> {
        self.ops
            .lock()
            .unwrap()
            .push(RecordedOp::CheckMergeability { pr: pr_number });
        Ok(self.mergeability.clone())
    }

    async fn merge(
        &self,
        pr_number: u64,
        method: MergeMethod,
        commit_message: &str,
    ) -> Result<MergeOutcome, GitHubError> {
        self.ops.lock().unwrap().push(RecordedOp::Merge {
            pr: pr_number,
            method,
            commit_message: commit_message.to_string(),
        });
        if self.fail_merge {
            return Err(GitHubError::MalformedResponse {
                operation: "merge pull request",
                detail: "merge was not performed".to_string(),
            });
        }
        Ok(MergeOutcome {
            sha: "abc123".to_string(),
            message: "Pull Request successfully merged".to_string(),
        })
    }

    async fn create_issue(
        &self,
        title: &str,
        _body: &str,
        _labels: Vec<String>,
    ) -> Result<String, GitHubError> {
        self.ops.lock().unwrap().push(RecordedOp::CreateIssue {
            title: title.to_string(),
        });
        Ok("https://github.com/owner/repo/issues/1".to_string())
    }

    async fn create_pr_comment(
        &self,
        pr_number: u64,
        _body: &str,
    ) -> Result<String, GitHubError> {
        self.ops
            .lock()
            .unwrap()
            .push(RecordedOp::CreatePrComment { pr: pr_number });
        Ok("https://github.com/owner/repo/pull/1#issuecomment-1".to_string())
    }

    async fn list_open_pull_requests(&self) -> Result<Vec<PullRequestSummary>, GitHubError> {
        self.ops
            .lock()
            .unwrap()
            .push(RecordedOp::ListOpenPullRequests);
        Ok(Vec::new())
    }
}

#[derive(Clone)]
struct ScriptedBuilder {
    ops: Arc<Mutex<Vec<RecordedOp>>>,
    opened: Arc<Mutex<Vec<(String, String)>>>,
    mergeability: MergeabilityResult,
    fail_merge: bool,
}

impl ScriptedBuilder {
    fn mergeable(body: &str) -> Self {
        Self::with_mergeability(MergeabilityResult {
            mergeable: true,
            reason: None,
            body: Some(body.to_string()),
        })
    }

    fn with_mergeability(mergeability: MergeabilityResult) -> Self {
        Self {
            ops: Arc::new(Mutex::new(Vec::new())),
            opened: Arc::new(Mutex::new(Vec::new())),
            mergeability,
            fail_merge: false,
        }
    }

    fn ops(&self) -> Vec<RecordedOp> {
        self.ops.lock().unwrap().clone()
    }

    fn opened(&self) -> Vec<(String, String)> {
        self.opened.lock().unwrap().clone()
    }
}

impl GatewayBuilder for ScriptedBuilder {
    type Gateway = ScriptedGateway;

    fn open(&self, credential: &str, repository: &str) -> Result<ScriptedGateway, GitHubError> {
        self.opened
            .lock()
            .unwrap()
            .push((credential.to_string(), repository.to_string()));
        Ok(ScriptedGateway {
            ops: self.ops.clone(),
            mergeability: self.mergeability.clone(),
            fail_merge: self.fail_merge,
        })
    }
}

struct CannedExtractor {
    value: Value,
}

#[async_trait]
impl IntentExtractor for CannedExtractor {
    async fn extract(
        &self,
        _context: &ConversationContext,
        _template: &str,
    ) -> Result<Value, ExtractionError> {
        Ok(self.value.clone())
    }
}

struct FailingExtractor;

#[async_trait]
impl IntentExtractor for FailingExtractor {
    async fn extract(
        &self,
        _context: &ConversationContext,
        _template: &str,
    ) -> Result<Value, ExtractionError> {
        Err(ExtractionError::MalformedResponse(
            "no JSON object found in response".to_string(),
        ))
    }
}

fn request(text: &str) -> ActionRequest {
    let mut context = ConversationContext::new("c1");
    context.record(Speaker::User, text);
    ActionRequest::new(text, &context)
}

fn merge_content() -> Value {
    json!({
        "repository": "owner/repo",
        "pullNumber": 123,
        "mergeMethod": "merge",
        "accessToken": "gho_testtoken",
        "rewardAmount": 10
    })
}

#[tokio::test]
async fn merged_pr_with_reward_attaches_metadata_and_commit_marker() {
    let extractor = CannedExtractor {
        value: merge_content(),
    };
    let builder = ScriptedBuilder::mergeable(PR_BODY);
    let mut orchestrator = MergeOrchestrator::new(&extractor, &builder);

    let response = orchestrator.run(&request("merge PR #123 in owner/repo")).await;

    assert_eq!(
        response.text,
        "Successfully merged PR #123! Merge commit: abc123"
    );
    let metadata = response.metadata.expect("reward metadata");
    assert_eq!(metadata.recipient, WALLET);
    assert_eq!(metadata.amount, "10");
    assert_eq!(orchestrator.phase(), MergePhase::Completed);

    assert_eq!(builder.opened(), vec![("gho_testtoken".to_string(), "owner/repo".to_string())]);
    let ops = builder.ops();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0], RecordedOp::CheckMergeability { pr: 123 });
    match &ops[1] {
        RecordedOp::Merge {
            pr,
            method,
            commit_message,
        } => {
            assert_eq!(*pr, 123);
            assert_eq!(*method, MergeMethod::Merge);
            assert!(commit_message.starts_with("Merge pull request #123"));
            assert!(commit_message.contains("PROCESS_TRX:::"));
            assert!(commit_message.contains(WALLET));
        }
        other => panic!("expected merge call, got {other:?}"),
    }
}

#[tokio::test]
async fn blocked_pr_is_rejected_without_a_merge_call() {
    let extractor = CannedExtractor {
        value: merge_content(),
    };
    let builder = ScriptedBuilder::with_mergeability(MergeabilityResult::from_pull(
        Some(true),
        Some("blocked"),
        Some(PR_BODY.to_string()),
    ));
    let mut orchestrator = MergeOrchestrator::new(&extractor, &builder);

    let response = orchestrator.run(&request("merge PR #123 in owner/repo")).await;

    assert_eq!(
        response.text,
        "Cannot merge PR #123: Required checks or reviews are pending"
    );
    assert!(response.metadata.is_none());
    assert_eq!(orchestrator.phase(), MergePhase::Rejected);
    assert_eq!(builder.ops(), vec![RecordedOp::CheckMergeability { pr: 123 }]);
}

#[tokio::test]
async fn conflicted_pr_reports_the_conflict_reason() {
    let extractor = CannedExtractor {
        value: merge_content(),
    };
    let builder = ScriptedBuilder::with_mergeability(MergeabilityResult::from_pull(
        Some(false),
        None,
        Some(PR_BODY.to_string()),
    ));
    let mut orchestrator = MergeOrchestrator::new(&extractor, &builder);

    let response = orchestrator.run(&request("merge PR #123 in owner/repo")).await;

    assert_eq!(
        response.text,
        "Cannot merge PR #123: Pull request has conflicts that must be resolved"
    );
    assert_eq!(builder.ops(), vec![RecordedOp::CheckMergeability { pr: 123 }]);
}

#[tokio::test]
async fn nonpositive_pull_number_rejects_before_any_remote_call() {
    let mut value = merge_content();
    value["pullNumber"] = json!(0);
    let extractor = CannedExtractor { value };
    let builder = ScriptedBuilder::mergeable(PR_BODY);
    let mut orchestrator = MergeOrchestrator::new(&extractor, &builder);

    let response = orchestrator.run(&request("merge PR #0 in owner/repo")).await;

    assert_eq!(response.text, INSUFFICIENT_MERGE_INFO);
    assert_eq!(orchestrator.phase(), MergePhase::Rejected);
    assert!(builder.opened().is_empty());
    assert!(builder.ops().is_empty());
}

#[tokio::test]
async fn extraction_failure_becomes_a_guidance_answer() {
    let builder = ScriptedBuilder::mergeable(PR_BODY);
    let mut orchestrator = MergeOrchestrator::new(&FailingExtractor, &builder);

    let response = orchestrator.run(&request("merge something somewhere")).await;

    assert_eq!(response.text, INSUFFICIENT_MERGE_INFO);
    assert_eq!(orchestrator.phase(), MergePhase::Rejected);
    assert!(builder.opened().is_empty());
}

#[tokio::test]
async fn merge_failure_is_reported_without_a_retry() {
    let extractor = CannedExtractor {
        value: merge_content(),
    };
    let mut builder = ScriptedBuilder::mergeable(PR_BODY);
    builder.fail_merge = true;
    let mut orchestrator = MergeOrchestrator::new(&extractor, &builder);

    let response = orchestrator.run(&request("merge PR #123 in owner/repo")).await;

    assert!(response.text.starts_with("Error merging PR:"));
    assert!(response.metadata.is_none());
    let merges = builder
        .ops()
        .into_iter()
        .filter(|op| matches!(op, RecordedOp::Merge { .. }))
        .count();
    assert_eq!(merges, 1);
}

#[tokio::test]
async fn no_reward_without_an_address_in_the_body() {
    let extractor = CannedExtractor {
        value: merge_content(),
    };
    let builder = ScriptedBuilder::mergeable("thanks for the contribution, no wallet here");
    let mut orchestrator = MergeOrchestrator::new(&extractor, &builder);

    let response = orchestrator.run(&request("merge PR #123 in owner/repo")).await;

    assert!(response.metadata.is_none());
    match &builder.ops()[1] {
        RecordedOp::Merge { commit_message, .. } => {
            assert!(!commit_message.contains("PROCESS_TRX"));
        }
        other => panic!("expected merge call, got {other:?}"),
    }
}

#[tokio::test]
async fn no_reward_without_a_supplied_amount() {
    let mut value = merge_content();
    value.as_object_mut().unwrap().remove("rewardAmount");
    let extractor = CannedExtractor { value };
    let builder = ScriptedBuilder::mergeable(PR_BODY);
    let mut orchestrator = MergeOrchestrator::new(&extractor, &builder);

    let response = orchestrator.run(&request("merge PR #123 in owner/repo")).await;

    assert!(response.text.starts_with("Successfully merged PR #123"));
    assert!(response.metadata.is_none());
}

#[tokio::test]
async fn router_dispatches_issue_creation_with_fallback_token() {
    let extractor = CannedExtractor {
        value: json!({
            "repository": "owner/repo",
            "title": "Bug Fix",
            "body": "There is a bug in the core module."
        }),
    };
    let builder = ScriptedBuilder::mergeable(PR_BODY);
    let router = ActionRouter::new(extractor, builder.clone(), Some("gho_fallback".to_string()));

    let response = router
        .dispatch(&request("Create a GitHub issue in owner/repo titled 'Bug Fix'"))
        .await;

    assert!(response
        .text
        .starts_with("GitHub issue created successfully! Issue URL:"));
    assert_eq!(
        builder.opened(),
        vec![("gho_fallback".to_string(), "owner/repo".to_string())]
    );
    assert_eq!(
        builder.ops(),
        vec![RecordedOp::CreateIssue {
            title: "Bug Fix".to_string()
        }]
    );
}

#[tokio::test]
async fn router_reports_empty_pull_request_listings() {
    let extractor = CannedExtractor {
        value: json!({"repository": "owner/repo"}),
    };
    let builder = ScriptedBuilder::mergeable(PR_BODY);
    let router = ActionRouter::new(extractor, builder.clone(), Some("gho_fallback".to_string()));

    let response = router.dispatch(&request("show me the open PRs")).await;

    assert_eq!(response.text, "No open pull requests found in owner/repo.");
    assert_eq!(builder.ops(), vec![RecordedOp::ListOpenPullRequests]);
}

#[tokio::test]
async fn unrecognized_text_gets_guidance_without_remote_calls() {
    let extractor = CannedExtractor {
        value: json!({}),
    };
    let builder = ScriptedBuilder::mergeable(PR_BODY);
    let router = ActionRouter::new(extractor, builder.clone(), None);

    let response = router.dispatch(&request("what's the weather like?")).await;

    assert_eq!(response.text, UNRECOGNIZED_REQUEST);
    assert!(builder.opened().is_empty());
    assert!(builder.ops().is_empty());
}
