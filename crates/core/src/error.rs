//! Error taxonomy for a liquidation cycle.
//!
//! Every variant is fatal for the run. A flagged user without usable
//! holdings is not an error; the cycle skips it.

use alloy::primitives::Address;
use lendsweep_api::SubgraphError;
use lendsweep_chain::ChainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CycleError {
    /// The indexer query failed; nothing was evaluated.
    #[error("user source failed: {0}")]
    DataSource(#[from] SubgraphError),

    /// The health-factor batch failed.
    #[error("health batch failed: {0}")]
    HealthBatch(#[source] ChainError),

    /// The balance/underlying batch for one user failed.
    #[error("position batch for {user} failed: {source}")]
    InspectionBatch { user: Address, source: ChainError },

    /// The un-batched collateral liquidity read failed.
    #[error("liquidity read of {token} failed: {source}")]
    LiquidityRead { token: Address, source: ChainError },

    /// Submitting or confirming the liquidation failed.
    #[error("liquidation of {user} failed: {source}")]
    Liquidation { user: Address, source: ChainError },

    /// Batch results could not be decoded.
    #[error("decode failed: {0}")]
    Decode(String),

    /// A health record referenced a pool that is not configured.
    #[error("pool {0} is not configured")]
    UnknownPool(Address),
}

impl From<alloy::sol_types::Error> for CycleError {
    fn from(err: alloy::sol_types::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
