// Mergetip Library - Chat-Driven GitHub PR Operations with Reward Settlement
// This exposes the core components for testing and integration

pub mod actions;
pub mod client;
pub mod config;
pub mod extractor;
pub mod github;
pub mod message;
pub mod telemetry;

// Re-export key types for easy access
pub use actions::{ActionKind, ActionRouter, MergeOrchestrator, MergePhase};
pub use client::{
    parse_amount_to_uint256, Attachment, ConversationCache, ConversationMessage,
    SettlementError, SettlementExecutor, Uint256, WalletConnector, WalletError, WalletSession,
};
pub use config::{config, init_config, MergetipConfig};
pub use extractor::{IntentExtractor, ModelIntentExtractor};
pub use github::{
    GatewayBuilder, GitHubError, GitHubService, MergeMethod, MergeOutcome, MergeabilityResult,
    OctocrabGatewayBuilder, PullRequestSummary, RepoOps,
};
pub use message::{
    ActionRequest, ConversationContext, ResponseContent, ResponseMessage, RewardInstruction,
    Speaker,
};
pub use telemetry::{create_action_span, generate_correlation_id, init_telemetry};
