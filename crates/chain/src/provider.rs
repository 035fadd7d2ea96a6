//! Provider management for HTTP RPC connections.
//! Uses Alloy providers for type-safe RPC interactions.

use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::contracts::IERC20;
use crate::error::ChainError;

/// Reads a single ERC20 balance outside of any batch.
#[async_trait]
pub trait BalanceReader: Send + Sync {
    /// Balance of `token` held by `holder`.
    async fn balance_of(&self, token: Address, holder: Address) -> Result<U256, ChainError>;
}

pub(crate) fn parse_rpc_url(raw: &str) -> Result<Url, ChainError> {
    Url::parse(raw).map_err(|e| ChainError::InvalidUrl(format!("{raw}: {e}")))
}

/// Provider manager for the read RPC endpoint.
#[derive(Debug, Clone)]
pub struct ProviderManager {
    /// HTTP URL used for reads
    rpc_url: String,
}

impl ProviderManager {
    /// Create a provider manager and verify the endpoint responds.
    pub async fn connect(rpc_url: &str) -> Result<Self, ChainError> {
        let manager = Self::new(rpc_url)?;
        let block = manager.block_number().await?;
        info!(rpc = rpc_url, block = block, "Provider connection verified");
        Ok(manager)
    }

    /// Create a provider manager without touching the network.
    pub fn new(rpc_url: &str) -> Result<Self, ChainError> {
        parse_rpc_url(rpc_url)?;
        Ok(Self {
            rpc_url: rpc_url.to_string(),
        })
    }

    /// Get the RPC URL.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Get current block number.
    pub async fn block_number(&self) -> Result<u64, ChainError> {
        let provider = ProviderBuilder::new().on_http(parse_rpc_url(&self.rpc_url)?);
        provider
            .get_block_number()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    /// Get chain ID.
    pub async fn chain_id(&self) -> Result<u64, ChainError> {
        let provider = ProviderBuilder::new().on_http(parse_rpc_url(&self.rpc_url)?);
        provider
            .get_chain_id()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    /// Check if provider is healthy.
    pub async fn health_check(&self) -> Result<bool, ChainError> {
        let block = self.block_number().await?;
        debug!(block = block, "Provider health check passed");
        Ok(block > 0)
    }
}

#[async_trait]
impl BalanceReader for ProviderManager {
    async fn balance_of(&self, token: Address, holder: Address) -> Result<U256, ChainError> {
        let provider = ProviderBuilder::new().on_http(parse_rpc_url(&self.rpc_url)?);
        let erc20 = IERC20::new(token, &provider);

        let balance = erc20
            .balanceOf(holder)
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?
            ._0;

        debug!(token = %token, holder = %holder, balance = %balance, "Balance read");
        Ok(balance)
    }
}
