pub mod errors;
pub mod service;
pub mod types;

pub use errors::GitHubError;
pub use service::{GatewayBuilder, GitHubService, OctocrabGatewayBuilder, RepoOps};
pub use types::{MergeMethod, MergeOutcome, MergeabilityResult, PullRequestSummary};
