// Wallet session seam.
//
// The crate ships no wallet transport of its own; hosts provide one by
// implementing these traits over their wallet connector.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// One contract call inside an invoke request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Call {
    pub contract_address: String,
    pub entry_point: String,
    pub calldata: Vec<String>,
}

/// Payload of a wallet invoke-transaction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvokeRequest {
    pub calls: Vec<Call>,
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet not connected")]
    NotConnected,

    #[error("wallet connection failed: {0}")]
    ConnectionFailed(String),

    #[error("transaction submission failed: {0}")]
    SubmissionFailed(String),
}

/// A connected wallet session: an account address plus invoke submission.
///
/// Submission has no timeout here; a stalled signing prompt blocks until the
/// user resolves it in the wallet UI.
#[async_trait]
pub trait WalletSession: Send + Sync {
    fn account_address(&self) -> &str;

    /// Submit an invoke transaction, returning its transaction identifier.
    async fn add_invoke_transaction(&self, request: InvokeRequest) -> Result<String, WalletError>;
}

/// Opens and closes wallet sessions.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    type Session: WalletSession;

    async fn connect(&self) -> Result<Self::Session, WalletError>;

    async fn disconnect(&self) -> Result<(), WalletError>;
}
