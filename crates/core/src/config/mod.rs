//! Configuration for the liquidation sweep.
//!
//! This module provides:
//! - Bot runtime parameters (cooldown, liquidation bonus, dry run)
//! - The deployment file layout (endpoints, contracts, pools, signer)
//! - The loader that resolves a deployment into an immutable value

mod bot;
mod deployment;
mod loader;

pub use bot::BotConfig;

pub use deployment::{
    ContractsConfig, DeploymentConfig, NetworkConfig, PoolEntry, SignerConfig, SubgraphConfig,
};

pub use loader::{
    load_deployment_from_env, DeploymentLoader, PoolConfig, ResolvedContracts,
    ResolvedDeployment, SecretKey, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, DRY_RUN_ENV,
};
