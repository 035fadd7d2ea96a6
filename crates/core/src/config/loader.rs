//! Deployment loader: turns a deployment file into an immutable,
//! fully-parsed configuration value built once at startup.

use super::{BotConfig, DeploymentConfig, PoolEntry, SubgraphConfig};
use alloy::primitives::Address;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Env var naming the deployment file.
pub const CONFIG_PATH_ENV: &str = "LENDSWEEP_CONFIG";

/// Default deployment file location.
pub const DEFAULT_CONFIG_PATH: &str = "./config/deployment.toml";

/// Env var forcing dry-run mode regardless of the file.
pub const DRY_RUN_ENV: &str = "LENDSWEEP_DRY_RUN";

/// Fully resolved deployment configuration.
#[derive(Debug, Clone)]
pub struct ResolvedDeployment {
    /// RPC endpoint
    pub rpc_url: String,
    /// Indexer endpoint
    pub subgraph_url: String,
    /// Global contract addresses
    pub contracts: ResolvedContracts,
    /// Pools in configured order
    pub pools: Vec<PoolConfig>,
    /// Indexer paging
    pub subgraph: SubgraphConfig,
    /// Bot runtime parameters
    pub bot: BotConfig,
    /// Liquidator private key
    pub signer_key: SecretKey,
}

/// Resolved global contract addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContracts {
    pub multicall: Address,
    pub router: Address,
    pub wrapped_native: Address,
    pub oracle: Option<Address>,
}

/// A lending pool with its static token configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Pool contract
    pub address: Address,
    /// Liquidation bot contract invoked for this pool
    pub bot: Address,
    /// Collateral-bearing tokens
    pub m_tokens: Vec<Address>,
    /// Debt-bearing tokens
    pub d_tokens: Vec<Address>,
}

/// Private key wrapper that never prints its contents.
#[derive(Clone)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl ResolvedDeployment {
    /// Pool addresses in configured order.
    pub fn pool_addresses(&self) -> Vec<Address> {
        self.pools.iter().map(|p| p.address).collect()
    }

    /// Look up a pool by address.
    pub fn pool(&self, address: Address) -> Option<&PoolConfig> {
        self.pools.iter().find(|p| p.address == address)
    }

    /// Log the resolved deployment (without secrets).
    pub fn log_config(&self) {
        info!(
            rpc = %self.rpc_url,
            subgraph = %self.subgraph_url,
            multicall = %self.contracts.multicall,
            router = %self.contracts.router,
            wrapped_native = %self.contracts.wrapped_native,
            pools = self.pools.len(),
            "Deployment loaded"
        );
        for pool in &self.pools {
            info!(
                pool = %pool.address,
                bot = %pool.bot,
                m_tokens = pool.m_tokens.len(),
                d_tokens = pool.d_tokens.len(),
                "Pool configured"
            );
        }
        self.bot.log_config();
    }
}

/// Deployment loader.
pub struct DeploymentLoader;

impl DeploymentLoader {
    /// Load and resolve a deployment file.
    pub fn load(path: impl AsRef<Path>) -> Result<ResolvedDeployment> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading deployment configuration");

        let config = DeploymentConfig::from_file(path)
            .with_context(|| format!("Failed to read deployment file {}", path.display()))?;
        Self::resolve(config)
    }

    /// Resolve a parsed deployment: expand env vars, parse addresses, validate.
    pub fn resolve(config: DeploymentConfig) -> Result<ResolvedDeployment> {
        let rpc_url = expand_required(&config.network.rpc_url, "network.rpc_url")?;
        let subgraph_url = expand_required(&config.network.subgraph_url, "network.subgraph_url")?;

        let contracts = ResolvedContracts {
            multicall: parse_addr(&config.contracts.multicall, "contracts.multicall")?,
            router: parse_addr(&config.contracts.router, "contracts.router")?,
            wrapped_native: parse_addr(&config.contracts.wrapped_native, "contracts.wrapped_native")?,
            oracle: config
                .contracts
                .oracle
                .as_deref()
                .map(|s| parse_addr(s, "contracts.oracle"))
                .transpose()?,
        };

        if config.pools.is_empty() {
            anyhow::bail!("At least one [[pools]] entry is required");
        }
        let pools = config
            .pools
            .iter()
            .enumerate()
            .map(|(i, entry)| resolve_pool(i, entry))
            .collect::<Result<Vec<_>>>()?;

        if config.bot.liquidation_bonus_bps > 10_000 {
            anyhow::bail!(
                "bot.liquidation_bonus_bps must be at most 10000, got {}",
                config.bot.liquidation_bonus_bps
            );
        }

        let bot = apply_dry_run_override(config.bot, DRY_RUN_ENV);

        let signer_key = SecretKey::new(expand_required(&config.signer.key, "signer.key")?);

        Ok(ResolvedDeployment {
            rpc_url,
            subgraph_url,
            contracts,
            pools,
            subgraph: config.subgraph,
            bot,
            signer_key,
        })
    }
}

/// Load the deployment named by `LENDSWEEP_CONFIG`, or the default path.
pub fn load_deployment_from_env() -> Result<ResolvedDeployment> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    DeploymentLoader::load(path)
}

fn resolve_pool(index: usize, entry: &PoolEntry) -> Result<PoolConfig> {
    let field = |name: &str| format!("pools[{index}].{name}");

    let m_tokens = entry
        .m_tokens
        .iter()
        .map(|t| parse_addr(t, &field("m_tokens")))
        .collect::<Result<Vec<_>>>()?;
    let d_tokens = entry
        .d_tokens
        .iter()
        .map(|t| parse_addr(t, &field("d_tokens")))
        .collect::<Result<Vec<_>>>()?;

    if m_tokens.is_empty() || d_tokens.is_empty() {
        anyhow::bail!("{} needs at least one m_token and one d_token", field("tokens"));
    }

    Ok(PoolConfig {
        address: parse_addr(&entry.address, &field("address"))?,
        bot: parse_addr(&entry.bot, &field("bot"))?,
        m_tokens,
        d_tokens,
    })
}

fn parse_addr(raw: &str, field: &str) -> Result<Address> {
    let value = expand_required(raw, field)?;
    value
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address for {}: '{}' ({})", field, value, e))
}

/// Expand `${VAR}` references, failing on empty values or unresolved vars.
fn expand_required(raw: &str, field: &str) -> Result<String> {
    let value = expand_env(raw)?;
    if value.trim().is_empty() {
        anyhow::bail!("{} is empty", field);
    }
    if value.contains("${") {
        anyhow::bail!("{} references an unset environment variable: {}", field, raw);
    }
    Ok(value)
}

/// Expand ${VAR_NAME} patterns with environment variable values.
/// Unset variables are left in place.
fn expand_env(s: &str) -> Result<String> {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")?;
    let mut result = s.to_string();

    for cap in re.captures_iter(s) {
        if let (Some(full_match), Some(var_match)) = (cap.get(0), cap.get(1)) {
            if let Ok(value) = std::env::var(var_match.as_str()) {
                result = result.replace(full_match.as_str(), &value);
            }
        }
    }

    Ok(result)
}

/// Force dry-run when the flag variable `var` is set.
fn apply_dry_run_override(mut bot: BotConfig, var: &str) -> BotConfig {
    if env_flag(var) {
        bot.dry_run = true;
    }
    bot
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
