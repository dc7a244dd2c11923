use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use moka::future::Cache;
use octocrab::Octocrab;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::errors::GitHubError;
use super::types::{MergeMethod, MergeOutcome, MergeabilityResult, PullRequestSummary};

const OPEN_PULLS_CACHE_KEY: &str = "open_pulls";

/// Repository operations the action handlers depend on.
///
/// The trait is the seam for testing: handlers run against recording fakes,
/// production runs against [`GitHubService`].
#[async_trait]
pub trait RepoOps: Send + Sync {
    /// Re-derive whether the pull request can be merged right now.
    async fn check_mergeability(&self, pr_number: u64)
        -> Result<MergeabilityResult, GitHubError>;

    /// Merge the pull request. The caller must have already confirmed
    /// mergeability; no re-check happens here.
    async fn merge(
        &self,
        pr_number: u64,
        method: MergeMethod,
        commit_message: &str,
    ) -> Result<MergeOutcome, GitHubError>;

    /// Create an issue, returning its URL.
    async fn create_issue(
        &self,
        title: &str,
        body: &str,
        labels: Vec<String>,
    ) -> Result<String, GitHubError>;

    /// Comment on a pull request, returning the comment URL. PR comments
    /// ride the issues API.
    async fn create_pr_comment(&self, pr_number: u64, body: &str)
        -> Result<String, GitHubError>;

    /// List open pull requests, newest first.
    async fn list_open_pull_requests(&self) -> Result<Vec<PullRequestSummary>, GitHubError>;
}

/// Opens a gateway for one orchestration pass.
///
/// Handlers never share gateways: each pass owns its credential and scope.
pub trait GatewayBuilder: Send + Sync {
    type Gateway: RepoOps;

    fn open(&self, credential: &str, repository: &str) -> Result<Self::Gateway, GitHubError>;
}

/// Production builder: one octocrab-backed service per pass.
#[derive(Debug, Default, Clone)]
pub struct OctocrabGatewayBuilder;

impl GatewayBuilder for OctocrabGatewayBuilder {
    type Gateway = GitHubService;

    fn open(&self, credential: &str, repository: &str) -> Result<GitHubService, GitHubError> {
        GitHubService::new(credential, repository)
    }
}

/// Authenticated gateway over one `owner/repo` scope.
///
/// One instance per orchestration pass; the credential and scope are owned
/// exclusively by the instance.
#[derive(Debug)]
pub struct GitHubService {
    octocrab: Octocrab,
    owner: String,
    repo: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    pulls_cache: Cache<String, Vec<PullRequestSummary>>,
}

/// Fields of the raw pull payload the mergeability check needs. The typed
/// octocrab model does not carry `mergeable_state`.
#[derive(Debug, Deserialize)]
struct PullDetails {
    mergeable: Option<bool>,
    mergeable_state: Option<String>,
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MergeResponse {
    sha: Option<String>,
    merged: bool,
    message: Option<String>,
}

impl GitHubService {
    pub fn new(token: &str, repository: &str) -> Result<Self, GitHubError> {
        let (owner, repo) = split_repository(repository)?;

        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(GitHubError::remote("build client"))?;

        // GitHub allows 5000 authenticated requests per hour; one per second
        // with a burst of ten stays far inside that.
        let quota = Quota::per_second(NonZeroU32::new(1).unwrap())
            .allow_burst(NonZeroU32::new(10).unwrap());
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let pulls_cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(60))
            .build();

        Ok(Self {
            octocrab,
            owner,
            repo,
            rate_limiter,
            pulls_cache,
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    async fn throttle(&self) {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;
    }
}

#[async_trait]
impl RepoOps for GitHubService {
    async fn check_mergeability(
        &self,
        pr_number: u64,
    ) -> Result<MergeabilityResult, GitHubError> {
        self.throttle().await;
        let route = format!("/repos/{}/{}/pulls/{}", self.owner, self.repo, pr_number);
        let details: PullDetails = self
            .octocrab
            .get(route, None::<&()>)
            .await
            .map_err(GitHubError::remote("check pull request mergeability"))?;

        debug!(
            pr_number,
            mergeable = ?details.mergeable,
            state = ?details.mergeable_state,
            "fetched pull request merge state"
        );
        Ok(MergeabilityResult::from_pull(
            details.mergeable,
            details.mergeable_state.as_deref(),
            details.body,
        ))
    }

    async fn merge(
        &self,
        pr_number: u64,
        method: MergeMethod,
        commit_message: &str,
    ) -> Result<MergeOutcome, GitHubError> {
        self.throttle().await;
        let route = format!(
            "/repos/{}/{}/pulls/{}/merge",
            self.owner, self.repo, pr_number
        );
        let payload = json!({
            "merge_method": method.as_str(),
            "commit_message": commit_message,
        });
        let response: MergeResponse = self
            .octocrab
            .put(route, Some(&payload))
            .await
            .map_err(GitHubError::remote("merge pull request"))?;

        if !response.merged {
            return Err(GitHubError::MalformedResponse {
                operation: "merge pull request",
                detail: response
                    .message
                    .unwrap_or_else(|| "merge was not performed".to_string()),
            });
        }
        let sha = response.sha.ok_or_else(|| GitHubError::MalformedResponse {
            operation: "merge pull request",
            detail: "no merge commit sha returned".to_string(),
        })?;

        info!(pr_number, sha = %sha, "merged pull request");
        Ok(MergeOutcome {
            sha,
            message: response.message.unwrap_or_default(),
        })
    }

    async fn create_issue(
        &self,
        title: &str,
        body: &str,
        labels: Vec<String>,
    ) -> Result<String, GitHubError> {
        self.throttle().await;
        let issue = self
            .octocrab
            .issues(&self.owner, &self.repo)
            .create(title)
            .body(body)
            .labels(labels)
            .send()
            .await
            .map_err(GitHubError::remote("create issue"))?;

        info!(issue = issue.number, "created issue");
        Ok(issue.html_url.to_string())
    }

    async fn create_pr_comment(
        &self,
        pr_number: u64,
        body: &str,
    ) -> Result<String, GitHubError> {
        self.throttle().await;
        let comment = self
            .octocrab
            .issues(&self.owner, &self.repo)
            .create_comment(pr_number, body)
            .await
            .map_err(GitHubError::remote("create pull request comment"))?;

        info!(pr_number, "created pull request comment");
        Ok(comment.html_url.to_string())
    }

    async fn list_open_pull_requests(&self) -> Result<Vec<PullRequestSummary>, GitHubError> {
        if let Some(cached) = self.pulls_cache.get(OPEN_PULLS_CACHE_KEY).await {
            debug!("open pull request listing served from cache");
            return Ok(cached);
        }

        self.throttle().await;
        let page = self
            .octocrab
            .pulls(&self.owner, &self.repo)
            .list()
            .state(octocrab::params::State::Open)
            .per_page(50)
            .send()
            .await
            .map_err(GitHubError::remote("list open pull requests"))?;

        let mut pulls: Vec<PullRequestSummary> = page
            .items
            .into_iter()
            .map(|pr| {
                let author = match &pr.user {
                    Some(user) => user.login.clone(),
                    None => "unknown".to_string(),
                };
                PullRequestSummary {
                    number: pr.number,
                    title: pr.title.clone().unwrap_or_default(),
                    author,
                    created_at: pr.created_at,
                    url: pr
                        .html_url
                        .as_ref()
                        .map(|url| url.to_string())
                        .unwrap_or_default(),
                }
            })
            .collect();
        pulls.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        self.pulls_cache
            .insert(OPEN_PULLS_CACHE_KEY.to_string(), pulls.clone())
            .await;
        Ok(pulls)
    }
}

fn split_repository(repository: &str) -> Result<(String, String), GitHubError> {
    let segments: Vec<&str> = repository.split('/').collect();
    match segments.as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(GitHubError::InvalidRepository(repository.to_string())),
    }
}
