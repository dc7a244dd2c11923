// Reward settlement: reward metadata in, token transfer out.

use thiserror::Error;
use tracing::{info, warn};

use crate::client::cache::ConversationMessage;
use crate::client::token::{parse_amount_to_uint256, AmountError, TOKEN_DECIMALS};
use crate::client::wallet::{Call, InvokeRequest, WalletError, WalletSession};
use crate::message::{ResponseMessage, RewardInstruction};

pub const TRANSFER_ENTRY_POINT: &str = "transfer";

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("wallet not connected")]
    WalletNotConnected,

    #[error(transparent)]
    InvalidAmount(#[from] AmountError),

    #[error(transparent)]
    Submission(#[from] WalletError),
}

/// Executes reward instructions against the configured token contract.
///
/// Deliberately independent of merge orchestration: a merge can land while
/// settlement fails, and the remedy is a manual retry, never a rollback.
pub struct SettlementExecutor {
    token_contract: String,
    decimals: u32,
}

impl SettlementExecutor {
    pub fn new(token_contract: impl Into<String>) -> Self {
        Self::with_decimals(token_contract, TOKEN_DECIMALS)
    }

    pub fn with_decimals(token_contract: impl Into<String>, decimals: u32) -> Self {
        Self {
            token_contract: token_contract.into(),
            decimals,
        }
    }

    /// First reward instruction carried by a batch of response messages.
    pub fn reward_in_responses(responses: &[ResponseMessage]) -> Option<&RewardInstruction> {
        responses.iter().find_map(|response| response.metadata.as_ref())
    }

    /// First reward instruction among cached messages, using the strict
    /// metadata shape; anything else is no reward.
    pub fn reward_in_messages(messages: &[ConversationMessage]) -> Option<RewardInstruction> {
        messages
            .iter()
            .filter_map(|message| message.metadata.as_ref())
            .find_map(RewardInstruction::from_metadata)
    }

    /// Build the transfer call: `calldata = [recipient, low, high]`.
    pub fn build_transfer_call(
        &self,
        instruction: &RewardInstruction,
    ) -> Result<Call, SettlementError> {
        let amount = parse_amount_to_uint256(&instruction.amount, self.decimals)?;
        Ok(Call {
            contract_address: self.token_contract.clone(),
            entry_point: TRANSFER_ENTRY_POINT.to_string(),
            calldata: vec![
                instruction.recipient.clone(),
                amount.low.to_string(),
                amount.high.to_string(),
            ],
        })
    }

    /// Submit the transfer through the wallet session, returning the
    /// transaction identifier. Without a session this stops with
    /// `WalletNotConnected` — a notice for the user, not a retry loop.
    pub async fn settle(
        &self,
        session: Option<&dyn WalletSession>,
        instruction: &RewardInstruction,
    ) -> Result<String, SettlementError> {
        let Some(session) = session else {
            warn!("wallet not connected; reward transfer skipped");
            return Err(SettlementError::WalletNotConnected);
        };

        let call = self.build_transfer_call(instruction)?;
        info!(
            recipient = %instruction.recipient,
            amount = %instruction.amount,
            account = session.account_address(),
            "submitting reward transfer"
        );
        let transaction = session
            .add_invoke_transaction(InvokeRequest { calls: vec![call] })
            .await?;
        info!(transaction = %transaction, "reward transfer submitted");
        Ok(transaction)
    }
}
