//! Liquidation sweep chain interaction layer.
//!
//! This crate provides:
//! - Contract bindings for the multicall aggregator, lending pool,
//!   bearing tokens and the liquidation bot contract
//! - A batched read executor backed by the multicall aggregator
//! - Provider management and single balance reads
//! - Transaction signing and sending

pub mod contracts;
mod error;
mod multicall;
mod provider;
mod signer;

pub use contracts::{
    ILiquidationBot, IMToken, IMulticall, IPool, LiquidationParams, SwapParams, IERC20,
};
pub use error::ChainError;
pub use multicall::{BatchCall, BatchCallExecutor, BatchOutput, MulticallAggregator};
pub use provider::{BalanceReader, ProviderManager};
pub use signer::{TransactionSender, TransactionSubmitter, TxOutcome};
