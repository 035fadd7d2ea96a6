//! Chain-layer error type.

use alloy::primitives::B256;
use thiserror::Error;

/// Errors raised while talking to the RPC endpoint or signing transactions.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The configured RPC URL could not be parsed.
    #[error("invalid RPC url: {0}")]
    InvalidUrl(String),

    /// Transport failure or a reverted `eth_call`.
    #[error("rpc call failed: {0}")]
    Rpc(String),

    /// The aggregator returned a different number of results than requested.
    #[error("multicall returned {actual} results for {expected} calls")]
    BatchLengthMismatch { expected: usize, actual: usize },

    /// Return data could not be ABI-decoded.
    #[error("failed to decode return data: {0}")]
    Decode(String),

    /// The signing key could not be loaded.
    #[error("signer error: {0}")]
    Signer(String),

    /// The transaction was mined with a failed status.
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: B256 },
}

impl From<alloy::sol_types::Error> for ChainError {
    fn from(err: alloy::sol_types::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
