// Types produced by the repository operation gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const REASON_CONFLICTS: &str = "Pull request has conflicts that must be resolved";
pub const REASON_BLOCKED: &str = "Required checks or reviews are pending";

/// How a pull request should be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    #[default]
    Merge,
    Squash,
    Rebase,
}

impl MergeMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "merge" => Some(MergeMethod::Merge),
            "squash" => Some(MergeMethod::Squash),
            "rebase" => Some(MergeMethod::Rebase),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MergeMethod::Merge => "merge",
            MergeMethod::Squash => "squash",
            MergeMethod::Rebase => "rebase",
        }
    }
}

/// Point-in-time answer to "can this pull request be merged right now".
///
/// Derived fresh on every attempt and never cached: the answer can change
/// between a check and the merge that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeabilityResult {
    pub mergeable: bool,
    pub reason: Option<String>,
    pub body: Option<String>,
}

impl MergeabilityResult {
    /// Map the pull payload's mergeable flag and merge-state label.
    ///
    /// A missing mergeable flag counts as unmergeable: GitHub may still be
    /// computing it, and reporting conflicts is what the upstream service
    /// always did with a falsy flag.
    pub fn from_pull(
        mergeable: Option<bool>,
        mergeable_state: Option<&str>,
        body: Option<String>,
    ) -> Self {
        if mergeable != Some(true) {
            return Self {
                mergeable: false,
                reason: Some(REASON_CONFLICTS.to_string()),
                body,
            };
        }
        if mergeable_state == Some("blocked") {
            return Self {
                mergeable: false,
                reason: Some(REASON_BLOCKED.to_string()),
                body,
            };
        }
        Self {
            mergeable: true,
            reason: None,
            body,
        }
    }
}

/// Result of a successful merge call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub sha: String,
    pub message: String,
}

/// Row of the open-pull-request listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub created_at: Option<DateTime<Utc>>,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_method_parses_known_values() {
        assert_eq!(MergeMethod::parse("merge"), Some(MergeMethod::Merge));
        assert_eq!(MergeMethod::parse("Squash"), Some(MergeMethod::Squash));
        assert_eq!(MergeMethod::parse(" rebase "), Some(MergeMethod::Rebase));
        assert_eq!(MergeMethod::parse("fast-forward"), None);
    }

    #[test]
    fn unmergeable_flag_reports_conflicts() {
        let result = MergeabilityResult::from_pull(Some(false), None, Some("body".into()));
        assert!(!result.mergeable);
        assert_eq!(result.reason.as_deref(), Some(REASON_CONFLICTS));
        assert_eq!(result.body.as_deref(), Some("body"));
    }

    #[test]
    fn missing_flag_counts_as_conflicts() {
        let result = MergeabilityResult::from_pull(None, Some("clean"), None);
        assert!(!result.mergeable);
        assert_eq!(result.reason.as_deref(), Some(REASON_CONFLICTS));
    }

    #[test]
    fn blocked_state_reports_pending_checks() {
        let result = MergeabilityResult::from_pull(Some(true), Some("blocked"), None);
        assert!(!result.mergeable);
        assert_eq!(result.reason.as_deref(), Some(REASON_BLOCKED));
    }

    #[test]
    fn clean_pull_is_mergeable() {
        let result = MergeabilityResult::from_pull(Some(true), Some("clean"), Some("pay".into()));
        assert!(result.mergeable);
        assert!(result.reason.is_none());
        assert_eq!(result.body.as_deref(), Some("pay"));
    }
}
