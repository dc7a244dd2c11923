use tracing::{error, warn};

use crate::actions::content::IssueCandidate;
use crate::actions::templates;
use crate::extractor::IntentExtractor;
use crate::github::service::GatewayBuilder;
use crate::github::RepoOps;
use crate::message::{ActionRequest, ResponseContent, ResponseMessage};

pub const INSUFFICIENT_ISSUE_INFO: &str = "Not enough information to create a GitHub issue. \
     Please respond with repository, title, body, and optional labels.";

pub const DEFAULT_ISSUE_LABEL: &str = "task";

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
        .extract(request.context(), templates::CREATE_ISSUE)
        .await
    {
        Ok(value) => IssueCandidate::from_value(&value),
        Err(e) => {
            warn!(error = %e, "issue extraction produced nothing usable");
            IssueCandidate::default()
        }
    };

    let Some(valid) = candidate.validate() else {
        return ResponseMessage::error(INSUFFICIENT_ISSUE_INFO, "invalid issue content");
    };

    let Some(token) = valid.access_token.as_deref().or(fallback_token) else {
        return ResponseMessage::error(
            "A GitHub access token is required to create an issue.",
            "missing access token",
        );
    };

    let gateway = match gateways.open(token, &valid.repository) {
        Ok(gateway) => gateway,
        Err(e) => {
            error!(error = %e, "could not open repository gateway");
            return ResponseMessage::error(format!("Error creating GitHub issue: {e}"), e.to_string());
        }
    };

    let labels = valid
        .labels
        .unwrap_or_else(|| vec![DEFAULT_ISSUE_LABEL.to_string()]);
    match gateway.create_issue(&valid.title, &valid.body, labels).await {
        Ok(url) => ResponseMessage::plain(
            format!("GitHub issue created successfully! Issue URL: {url}"),
            ResponseContent::IssueCreated { url },
        ),
        Err(e) => {
            error!(error = %e, "issue creation failed");
            ResponseMessage::error(format!("Error creating GitHub issue: {e}"), e.to_string())
        }
    }
}
