// Merge orchestration: extraction, validation, mergeability gate, merge,
// reward composition, result assembly.

use tracing::{debug, error, info, warn};

use crate::actions::content::MergePrCandidate;
use crate::actions::{reward, templates};
use crate::extractor::IntentExtractor;
use crate::github::service::GatewayBuilder;
use crate::github::RepoOps;
use crate::message::{ActionRequest, ResponseContent, ResponseMessage};

/// Guidance answer when the candidate fails validation. No remote call has
/// been made at that point.
pub const INSUFFICIENT_MERGE_INFO: &str = "Please provide a valid repository and PR number.";

/// Phases of one merge orchestration pass, strictly sequential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePhase {
    Received,
    Extracting,
    Validating,
    CheckingMergeability,
    Merging,
    ComposingResult,
    Completed,
    Rejected,
}

/// Sequences one merge pass. Suspends only at the extraction call, the
/// mergeability check, and the merge call; nothing is retried and nothing is
/// rolled back.
pub struct MergeOrchestrator<'a, E, B> {
    extractor: &'a E,
    gateways: &'a B,
    phase: MergePhase,
}

impl<'a, E, B> MergeOrchestrator<'a, E, B>
where
    E: IntentExtractor,
    B: GatewayBuilder,
{
    pub fn new(extractor: &'a E, gateways: &'a B) -> Self {
        Self {
            extractor,
            gateways,
            phase: MergePhase::Received,
        }
    }

    pub fn phase(&self) -> MergePhase {
        self.phase
    }

    fn advance(&mut self, next: MergePhase) {
        debug!(from = ?self.phase, to = ?next, "merge orchestration transition");
        self.phase = next;
    }

    pub async fn run(&mut self, request: &ActionRequest) -> ResponseMessage {
        self.advance(MergePhase::Extracting);
        let candidate = match self
            .extractor
            .extract(request.context(), templates::MERGE_PR)
            .await
        {
            Ok(value) => MergePrCandidate::from_value(&value),
            Err(e) => {
                // Extraction failure is recovered locally: an empty candidate
                // fails validation and turns into a guidance answer.
                warn!(error = %e, "merge extraction produced nothing usable");
                MergePrCandidate::default()
            }
        };

        self.advance(MergePhase::Validating);
        let Some(valid) = candidate.validate() else {
            self.advance(MergePhase::Rejected);
            return ResponseMessage::error(INSUFFICIENT_MERGE_INFO, "invalid merge request content");
        };

        let gateway = match self.gateways.open(&valid.access_token, &valid.repository) {
            Ok(gateway) => gateway,
            Err(e) => {
                error!(error = %e, "could not open repository gateway");
                return ResponseMessage::error(format!("Error merging PR: {e}"), e.to_string());
            }
        };

        self.advance(MergePhase::CheckingMergeability);
        let mergeability = match gateway.check_mergeability(valid.pull_number).await {
            Ok(result) => result,
            Err(e) => {
                error!(pull_number = valid.pull_number, error = %e, "mergeability check failed");
                return ResponseMessage::error(format!("Error merging PR: {e}"), e.to_string());
            }
        };

        if !mergeability.mergeable {
            let reason = mergeability
                .reason
                .unwrap_or_else(|| "not mergeable".to_string());
            info!(pull_number = valid.pull_number, %reason, "merge rejected");
            self.advance(MergePhase::Rejected);
            return ResponseMessage::error(
                format!("Cannot merge PR #{}: {}", valid.pull_number, reason),
                reason,
            );
        }

        // Reward discovery runs against the narrative text the mergeability
        // check just returned; the commit message carries the marker.
        let instruction =
            reward::compose_reward(mergeability.body.as_deref(), valid.reward_amount.as_deref());
        let commit_message = reward::merge_commit_message(
            valid.pull_number,
            valid.commit_message.as_deref(),
            instruction.as_ref(),
        );

        self.advance(MergePhase::Merging);
        let outcome = match gateway
            .merge(valid.pull_number, valid.merge_method, &commit_message)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(pull_number = valid.pull_number, error = %e, "merge call failed");
                return ResponseMessage::error(format!("Error merging PR: {e}"), e.to_string());
            }
        };

        self.advance(MergePhase::ComposingResult);
        let text = format!(
            "Successfully merged PR #{}! Merge commit: {}",
            valid.pull_number, outcome.sha
        );
        let content = ResponseContent::MergeResult {
            sha: outcome.sha,
            message: outcome.message,
        };
        let response = match instruction {
            Some(instruction) => ResponseMessage::with_metadata(text, content, instruction),
            None => ResponseMessage::plain(text, content),
        };

        self.advance(MergePhase::Completed);
        response
    }
}
