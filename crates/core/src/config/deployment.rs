//! Deployment file layout: network endpoints, contracts, pools and signer.
//!
//! Address and URL fields are kept as strings here; they may reference
//! environment variables (`${VAR}`) and are resolved by the loader.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::BotConfig;
use lendsweep_api::DEFAULT_PAGE_SIZE;

/// Full deployment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// RPC and indexer endpoints
    pub network: NetworkConfig,
    /// Global contract addresses
    pub contracts: ContractsConfig,
    /// Lending pools to sweep (one entry = single-pool deployment)
    #[serde(default)]
    pub pools: Vec<PoolEntry>,
    /// Indexer paging
    #[serde(default)]
    pub subgraph: SubgraphConfig,
    /// Bot runtime parameters
    #[serde(default)]
    pub bot: BotConfig,
    /// Liquidator account
    pub signer: SignerConfig,
}

/// Network endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub subgraph_url: String,
}

/// Global contract addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    /// Multicall aggregator
    pub multicall: String,
    /// Swap router passed to the liquidation bot
    pub router: String,
    /// Wrapped native asset (profit leg of the swap)
    pub wrapped_native: String,
    /// Price oracle (carried for reference, not used for sizing)
    #[serde(default)]
    pub oracle: Option<String>,
}

/// One lending pool and its liquidation bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolEntry {
    /// Pool contract
    pub address: String,
    /// Liquidation bot contract for this pool
    pub bot: String,
    /// Collateral-bearing tokens
    pub m_tokens: Vec<String>,
    /// Debt-bearing tokens
    pub d_tokens: Vec<String>,
}

/// Indexer paging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub max_users: Option<usize>,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for SubgraphConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_users: None,
        }
    }
}

/// Liquidator account.
#[derive(Clone, Serialize, Deserialize)]
pub struct SignerConfig {
    /// Private key, usually `${LIQUIDATOR_KEY}`
    pub key: String,
}

impl std::fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerConfig")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl DeploymentConfig {
    /// Load deployment config from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse deployment config from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: DeploymentConfig = toml::from_str(content)?;
        Ok(config)
    }
}
