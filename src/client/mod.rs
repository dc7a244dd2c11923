pub mod cache;
pub mod settlement;
pub mod token;
pub mod wallet;

pub use cache::{Attachment, CacheError, ConversationCache, ConversationMessage};
pub use settlement::{SettlementError, SettlementExecutor};
pub use token::{parse_amount_to_uint256, AmountError, Uint256, TOKEN_DECIMALS};
pub use wallet::{Call, InvokeRequest, WalletConnector, WalletError, WalletSession};
