//! Transaction signer and sender for liquidations.
//! Uses Alloy providers for type-safe RPC interactions.
//!
//! Nonce, gas and chain id are filled by the provider; the sender only
//! signs, submits and waits for one confirmation.

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::ChainError;
use crate::provider::parse_rpc_url;

/// Confirmations awaited before a submission is considered final.
const REQUIRED_CONFIRMATIONS: u64 = 1;

/// Summary of a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Signs and submits transactions, blocking until confirmation.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Address of the signing account.
    fn address(&self) -> Address;

    /// Send `calldata` to `to` and wait for it to be mined successfully.
    async fn submit(&self, to: Address, calldata: Bytes) -> Result<TxOutcome, ChainError>;
}

/// Transaction sender backed by a local private key.
pub struct TransactionSender {
    /// RPC URL for sending transactions
    rpc_url: String,
    /// Signer wallet
    wallet: EthereumWallet,
    /// Signer address
    pub address: Address,
}

impl TransactionSender {
    /// Create a new transaction sender from a private key (with or without `0x`).
    pub fn new(private_key: &str, rpc_url: &str) -> Result<Self, ChainError> {
        parse_rpc_url(rpc_url)?;

        let key_str = private_key.trim().trim_start_matches("0x");
        let signer: PrivateKeySigner = key_str
            .parse()
            .map_err(|e| ChainError::Signer(format!("{e}")))?;
        let address = signer.address();

        info!(address = %address, "Transaction sender initialized");

        Ok(Self {
            rpc_url: rpc_url.to_string(),
            wallet: EthereumWallet::from(signer),
            address,
        })
    }

    /// Get the RPC URL.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

#[async_trait]
impl TransactionSubmitter for TransactionSender {
    fn address(&self) -> Address {
        self.address
    }

    async fn submit(&self, to: Address, calldata: Bytes) -> Result<TxOutcome, ChainError> {
        let total_start = Instant::now();

        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .on_http(parse_rpc_url(&self.rpc_url)?);

        let tx = TransactionRequest::default()
            .with_from(self.address)
            .with_to(to)
            .with_input(calldata);

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        let tx_hash = *pending.tx_hash();

        info!(
            tx_hash = %tx_hash,
            submit_ms = total_start.elapsed().as_millis(),
            "Transaction submitted, waiting for confirmation"
        );

        let receipt = pending
            .with_required_confirmations(REQUIRED_CONFIRMATIONS)
            .get_receipt()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        if !receipt.status() {
            warn!(
                tx_hash = %tx_hash,
                total_ms = total_start.elapsed().as_millis(),
                "Transaction reverted"
            );
            return Err(ChainError::Reverted { tx_hash });
        }

        let outcome = TxOutcome {
            tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used as u64,
        };

        info!(
            tx_hash = %tx_hash,
            block = outcome.block_number.unwrap_or(0),
            gas_used = outcome.gas_used,
            total_ms = total_start.elapsed().as_millis(),
            "Transaction confirmed"
        );

        Ok(outcome)
    }
}

impl std::fmt::Debug for TransactionSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSender")
            .field("address", &self.address)
            .field("rpc_url", &self.rpc_url)
            .finish_non_exhaustive()
    }
}
