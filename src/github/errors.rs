use thiserror::Error;

/// Failures raised by the repository operation gateway.
///
/// Every remote-call failure collapses into `RemoteOperationFailed`; retries
/// are the caller's prerogative and this gateway performs none.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("invalid repository format {0:?}: expected \"owner/repo\"")]
    InvalidRepository(String),

    #[error("failed to {operation}: {cause}")]
    RemoteOperationFailed {
        operation: &'static str,
        #[source]
        cause: octocrab::Error,
    },

    #[error("{operation} returned an unusable response: {detail}")]
    MalformedResponse {
        operation: &'static str,
        detail: String,
    },
}

impl GitHubError {
    /// Map an octocrab error into the remote-failure taxonomy for `operation`.
    pub fn remote(operation: &'static str) -> impl FnOnce(octocrab::Error) -> Self {
        move |cause| GitHubError::RemoteOperationFailed { operation, cause }
    }
}
