//! Contract bindings for the lending market and its helpers.
//!
//! - [`common`]: ERC20 and the multicall aggregator
//! - [`lending`]: pool health queries, bearing tokens and the liquidation bot

pub mod common;
pub mod lending;

pub use common::{Call, IMulticall, IERC20};
pub use lending::{ILiquidationBot, IMToken, IPool, LiquidationParams, SwapParams};
