//! Liquidation sweep core logic.
//!
//! This crate provides the pipeline run once per invocation:
//! - Account health evaluation across every user and pool in one batch
//! - Position inspection of a pool's collateral and debt bearing tokens
//! - Liquidation sizing with a configurable bonus and liquidity cap
//! - Dispatch to the per-pool liquidation bot with a cooldown
//! - Cycle orchestration and deployment configuration

pub mod config;
mod cycle;
mod dispatcher;
mod error;
mod health;
mod inspector;
mod planner;
pub mod u256_math;

#[cfg(test)]
mod testing;

pub use config::{
    load_deployment_from_env, BotConfig, DeploymentLoader, PoolConfig, ResolvedContracts,
    ResolvedDeployment, SecretKey,
};
pub use cycle::{CycleReport, LiquidationCycle, LiquidationRecord};
pub use dispatcher::{encode_execute, DispatchOutcome, LiquidationDispatcher};
pub use error::CycleError;
pub use health::{
    decode_health, health_calls, matrix_position, AccountHealthEvaluator, HealthRecord,
    HealthScan,
};
pub use inspector::{
    decode_probes, holdings_from, pool_probes, probe_calls, CollateralHolding, DebtHolding,
    Holdings, PositionInspector, TokenProbe, TokenReading, TokenSide,
};
pub use planner::{LiquidationPlan, LiquidationPlanner, SwapRoute, UNLIMITED_DEBT_TO_COVER};
