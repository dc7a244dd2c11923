// Action kinds and their router.
//
// The closed set of tagged variants below replaces the host-runtime
// capability match of plugin systems: every dispatch decision is owned here.

pub mod comment;
pub mod content;
pub mod issue;
pub mod list_prs;
pub mod merge;
pub mod reward;
pub mod templates;

pub use merge::{MergeOrchestrator, MergePhase};

use tracing::info;

use crate::extractor::IntentExtractor;
use crate::github::service::GatewayBuilder;
use crate::message::{ActionRequest, ResponseMessage};

pub const UNRECOGNIZED_REQUEST: &str = "I can merge pull requests, create issues, comment on \
     pull requests, and list open pull requests. Tell me which one you need.";

/// One conversational intent category with its own template and validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    MergePullRequest,
    CreateIssue,
    CommentOnPullRequest,
    ListOpenPullRequests,
}

impl ActionKind {
    pub fn template(&self) -> &'static str {
        match self {
            ActionKind::MergePullRequest => templates::MERGE_PR,
            ActionKind::CreateIssue => templates::CREATE_ISSUE,
            ActionKind::CommentOnPullRequest => templates::PR_COMMENT,
            ActionKind::ListOpenPullRequests => templates::LIST_PRS,
        }
    }

    /// Deterministic keyword routing over the user's text. Merge wins over
    /// the other kinds because reward requests phrase themselves many ways.
    pub fn match_text(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        if lowered.contains("merge") || lowered.contains("reward") {
            return Some(ActionKind::MergePullRequest);
        }
        if lowered.contains("issue") {
            return Some(ActionKind::CreateIssue);
        }
        if lowered.contains("comment") {
            return Some(ActionKind::CommentOnPullRequest);
        }
        let names_pulls = lowered.contains("pull request") || lowered.contains("pr");
        if names_pulls
            && (lowered.contains("list") || lowered.contains("show") || lowered.contains("open"))
        {
            return Some(ActionKind::ListOpenPullRequests);
        }
        None
    }
}

/// Explicit dispatcher over the closed action set.
pub struct ActionRouter<E, B> {
    extractor: E,
    gateways: B,
    fallback_token: Option<String>,
}

impl<E, B> ActionRouter<E, B>
where
    E: IntentExtractor,
    B: GatewayBuilder,
{
    pub fn new(extractor: E, gateways: B, fallback_token: Option<String>) -> Self {
        Self {
            extractor,
            gateways,
            fallback_token,
        }
    }

    /// Route free-form text to an action kind, then handle it. Unrecognized
    /// text gets a guidance answer without any extraction or remote call.
    pub async fn dispatch(&self, request: &ActionRequest) -> ResponseMessage {
        match ActionKind::match_text(request.text()) {
            Some(kind) => self.handle(kind, request).await,
            None => ResponseMessage::error(UNRECOGNIZED_REQUEST, "unrecognized request"),
        }
    }

    pub async fn handle(&self, kind: ActionKind, request: &ActionRequest) -> ResponseMessage {
        info!(
            ?kind,
            conversation_id = request.conversation_id(),
            "dispatching action"
        );
        match kind {
            ActionKind::MergePullRequest => {
                MergeOrchestrator::new(&self.extractor, &self.gateways)
                    .run(request)
                    .await
            }
            ActionKind::CreateIssue => {
                issue::run(
                    &self.extractor,
                    &self.gateways,
                    self.fallback_token.as_deref(),
                    request,
                )
                .await
            }
            ActionKind::CommentOnPullRequest => {
                comment::run(
                    &self.extractor,
                    &self.gateways,
                    self.fallback_token.as_deref(),
                    request,
                )
                .await
            }
            ActionKind::ListOpenPullRequests => {
                list_prs::run(
                    &self.extractor,
                    &self.gateways,
                    self.fallback_token.as_deref(),
                    request,
                )
                .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_routing_picks_the_expected_kind() {
        assert_eq!(
            ActionKind::match_text("Merge PR #123 in octocat/hello-world"),
            Some(ActionKind::MergePullRequest)
        );
        assert_eq!(
            ActionKind::match_text("Reward #19 with 20 tokens"),
            Some(ActionKind::MergePullRequest)
        );
        assert_eq!(
            ActionKind::match_text("Open an issue titled 'Bug' in octocat/hello-world"),
            Some(ActionKind::CreateIssue)
        );
        assert_eq!(
            ActionKind::match_text("Comment on pull request #4: looks good"),
            Some(ActionKind::CommentOnPullRequest)
        );
        assert_eq!(
            ActionKind::match_text("Show me the open PRs in octocat/hello-world"),
            Some(ActionKind::ListOpenPullRequests)
        );
        assert_eq!(ActionKind::match_text("What's the weather like?"), None);
    }
}
