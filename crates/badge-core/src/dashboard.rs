//! Ownership dashboard

use serde::Serialize;

use crate::contract::{BadgeIndexer, OwnedBadge, TokenBalance, TokenLedger};
use crate::error::Error;

/// What an account holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// Account the dashboard was loaded for
    pub owner: String,
    /// Badges owned by the account
    pub badges: Vec<OwnedBadge>,
    /// Reward token balance
    pub token_balance: TokenBalance,
}

/// Load owned badges and the token balance for `owner`
///
/// Both reads run concurrently; the first failure is returned.
pub async fn load_dashboard<I, L>(indexer: &I, ledger: &L, owner: &str) -> Result<Dashboard, Error>
where
    I: BadgeIndexer,
    L: TokenLedger,
{
    let (badges, token_balance) =
        tokio::try_join!(indexer.owned_badges(owner), ledger.balance_of(owner))?;
    tracing::debug!(owner, badges = badges.len(), "loaded dashboard");

    Ok(Dashboard {
        owner: owner.to_string(),
        badges,
        token_balance,
    })
}
