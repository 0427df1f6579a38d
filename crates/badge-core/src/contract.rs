//! On-chain collaborators
//!
//! The badge contract, the NFT indexer and the reward token ledger live
//! outside this crate. They are consumed through these traits so callers can
//! plug in a chain client, and tests can plug in fakes.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// Errors reported by on-chain collaborators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    /// The call reverted or was refused
    #[error("Contract call rejected: {0}")]
    Rejected(String),
    /// The node or indexer could not be reached
    #[error("Transport error: {0}")]
    Transport(String),
    /// Address is not valid for the target chain
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// A request to mint one badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    /// URI of the badge's metadata document
    pub token_uri: String,
    /// Receiving address; the caller's own account when `None`
    pub recipient: Option<String>,
}

/// Outcome of a mint call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    /// Transaction hash
    pub transaction_hash: String,
    /// Token id, when the contract reports it
    pub token_id: Option<u64>,
}

/// Badge minting contract
pub trait BadgeContract: Send + Sync {
    /// Mint a badge whose metadata lives at `request.token_uri`
    fn mint(
        &self,
        request: MintRequest,
    ) -> impl Future<Output = Result<MintReceipt, ContractError>> + Send;
}

/// A badge held by an account, as reported by an NFT indexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedBadge {
    /// Token id
    pub token_id: u64,
    /// Token URI
    pub token_uri: String,
    /// Resolved metadata, when the indexer has it
    pub name: Option<String>,
    /// Resolved artwork reference, when the indexer has it
    pub image: Option<String>,
}

/// Lists the badges an account owns
pub trait BadgeIndexer: Send + Sync {
    /// Badges owned by `owner`
    fn owned_badges(
        &self,
        owner: &str,
    ) -> impl Future<Output = Result<Vec<OwnedBadge>, ContractError>> + Send;
}

/// Token balance in base units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    /// Amount in the token's smallest unit
    pub raw: u128,
    /// Number of decimals the token uses
    pub decimals: u8,
}

impl TokenBalance {
    /// Human-readable amount, e.g. `1.5` for `raw = 15, decimals = 1`
    ///
    /// Trailing zeros in the fractional part are dropped.
    pub fn display_amount(&self) -> String {
        if self.decimals == 0 {
            return self.raw.to_string();
        }
        let Some(scale) = 10u128.checked_pow(u32::from(self.decimals)) else {
            return format!("{}e-{}", self.raw, self.decimals);
        };
        let whole = self.raw / scale;
        let fraction = self.raw % scale;
        if fraction == 0 {
            return whole.to_string();
        }
        let fraction = format!("{fraction:0width$}", width = self.decimals as usize);
        format!("{whole}.{}", fraction.trim_end_matches('0'))
    }
}

/// Reward token ledger
pub trait TokenLedger: Send + Sync {
    /// Balance held by `owner`
    fn balance_of(
        &self,
        owner: &str,
    ) -> impl Future<Output = Result<TokenBalance, ContractError>> + Send;
}
