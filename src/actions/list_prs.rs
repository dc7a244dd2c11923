use tracing::{error, warn};

use crate::actions::content::ListPullsCandidate;
use crate::actions::templates;
use crate::extractor::IntentExtractor;
use crate::github::service::GatewayBuilder;
use crate::github::RepoOps;
use crate::message::{ActionRequest, ResponseContent, ResponseMessage};

pub const INSUFFICIENT_LIST_INFO: &str =
    "Please provide a valid repository name in the format owner/repo.";

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
        .extract(request.context(), templates::LIST_PRS)
        .await
    {
        Ok(value) => ListPullsCandidate::from_value(&value),
        Err(e) => {
            warn!(error = %e, "listing extraction produced nothing usable");
            ListPullsCandidate::default()
        }
    };

    let Some(valid) = candidate.validate() else {
        return ResponseMessage::error(INSUFFICIENT_LIST_INFO, "invalid repository format");
    };

    let Some(token) = valid.access_token.as_deref().or(fallback_token) else {
        return ResponseMessage::error(
            "A GitHub access token is required to list pull requests.",
            "missing access token",
        );
    };

    let gateway = match gateways.open(token, &valid.repository) {
        Ok(gateway) => gateway,
        Err(e) => {
            error!(error = %e, "could not open repository gateway");
            return ResponseMessage::error(
                format!("Error fetching pull requests: {e}"),
                e.to_string(),
            );
        }
    };

    match gateway.list_open_pull_requests().await {
        Ok(pulls) if pulls.is_empty() => ResponseMessage::plain(
            format!("No open pull requests found in {}.", valid.repository),
            ResponseContent::PullRequests { pulls },
        ),
        Ok(pulls) => {
            let rows = pulls
                .iter()
                .map(|pr| format!("#{}: {} (by {})", pr.number, pr.title, pr.author))
                .collect::<Vec<_>>()
                .join("\n");
            ResponseMessage::plain(
                format!("Open Pull Requests in {}:\n{rows}", valid.repository),
                ResponseContent::PullRequests { pulls },
            )
        }
        Err(e) => {
            error!(error = %e, "pull request listing failed");
            ResponseMessage::error(format!("Error fetching pull requests: {e}"), e.to_string())
        }
    }
}
