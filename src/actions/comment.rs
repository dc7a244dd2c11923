use tracing::{error, warn};

use crate::actions::content::CommentCandidate;
use crate::actions::templates;
use crate::extractor::IntentExtractor;
use crate::github::service::GatewayBuilder;
use crate::github::RepoOps;
use crate::message::{ActionRequest, ResponseContent, ResponseMessage};

pub const INSUFFICIENT_COMMENT_INFO: &str =
    "Please provide a valid repository, PR number, and comment text.";

pub async fn run<E, B>(
    extractor: &E,
    gateways: &B,
    fallback_token: Option<&str>,
    request: &ActionRequest,
) -> ResponseMessage
where
    E: IntentExtractor,
    B: GatewayBuilder,
{
    let candidate = match extractor
        .extract(request.context(), templates::PR_COMMENT)
        .await
    {
        Ok(value) => CommentCandidate::from_value(&value),
        Err(e) => {
            warn!(error = %e, "comment extraction produced nothing usable");
            CommentCandidate::default()
        }
    };

    let Some(valid) = candidate.validate() else {
        return ResponseMessage::error(INSUFFICIENT_COMMENT_INFO, "invalid comment content");
    };

    let Some(token) = valid.access_token.as_deref().or(fallback_token) else {
        return ResponseMessage::error(
            "A GitHub access token is required to comment on a pull request.",
            "missing access token",
        );
    };

    let gateway = match gateways.open(token, &valid.repository) {
        Ok(gateway) => gateway,
        Err(e) => {
            error!(error = %e, "could not open repository gateway");
            return ResponseMessage::error(
                format!("Error adding comment to PR: {e}"),
                e.to_string(),
            );
        }
    };

    match gateway
        .create_pr_comment(valid.pull_number, &valid.comment)
        .await
    {
        Ok(url) => ResponseMessage::plain(
            format!(
                "Comment added successfully to PR #{}! Comment URL: {url}",
                valid.pull_number
            ),
            ResponseContent::CommentPosted { url },
        ),
        Err(e) => {
            error!(error = %e, "comment creation failed");
            ResponseMessage::error(format!("Error adding comment to PR: {e}"), e.to_string())
        }
    }
}
