//! Batched read-only calls through the multicall aggregator.
//!
//! Every batch is a single `eth_call` against one block, so all results are
//! mutually consistent. The aggregator reverts as a whole when any inner
//! call reverts; partial results are never returned.

use alloy::primitives::{Address, Bytes};
use alloy::providers::ProviderBuilder;
use async_trait::async_trait;
use tracing::debug;

use crate::contracts::{Call, IMulticall};
use crate::error::ChainError;
use crate::provider::parse_rpc_url;

/// A single read request: target contract and ABI-encoded calldata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCall {
    pub target: Address,
    pub call_data: Bytes,
}

impl BatchCall {
    pub fn new(target: Address, call_data: impl Into<Bytes>) -> Self {
        Self {
            target,
            call_data: call_data.into(),
        }
    }
}

/// Raw results of a batch, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutput {
    /// Block the batch was executed against
    pub block_number: u64,
    /// One entry per request
    pub return_data: Vec<Bytes>,
}

impl BatchOutput {
    pub fn len(&self) -> usize {
        self.return_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.return_data.is_empty()
    }
}

/// Executes an ordered list of read calls as one atomic request.
#[async_trait]
pub trait BatchCallExecutor: Send + Sync {
    /// Execute `calls` and return one raw result per call, preserving order.
    async fn aggregate(&self, calls: &[BatchCall]) -> Result<BatchOutput, ChainError>;
}

/// [`BatchCallExecutor`] backed by an on-chain multicall aggregator.
#[derive(Debug, Clone)]
pub struct MulticallAggregator {
    rpc_url: String,
    address: Address,
}

impl MulticallAggregator {
    pub fn new(rpc_url: impl Into<String>, address: Address) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            address,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl BatchCallExecutor for MulticallAggregator {
    async fn aggregate(&self, calls: &[BatchCall]) -> Result<BatchOutput, ChainError> {
        if calls.is_empty() {
            return Ok(BatchOutput::default());
        }

        let provider = ProviderBuilder::new().on_http(parse_rpc_url(&self.rpc_url)?);
        let multicall = IMulticall::new(self.address, &provider);

        let request: Vec<Call> = calls
            .iter()
            .map(|c| Call {
                target: c.target,
                callData: c.call_data.clone(),
            })
            .collect();

        let result = multicall
            .aggregate(request)
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        ensure_batch_len(calls.len(), result.returnData.len())?;

        let output = BatchOutput {
            block_number: result.blockNumber.saturating_to::<u64>(),
            return_data: result.returnData,
        };

        debug!(
            aggregator = %self.address,
            calls = calls.len(),
            block = output.block_number,
            "Multicall batch executed"
        );

        Ok(output)
    }
}

/// Reject aggregator responses whose length does not match the request.
pub(crate) fn ensure_batch_len(expected: usize, actual: usize) -> Result<(), ChainError> {
    if expected != actual {
        return Err(ChainError::BatchLengthMismatch { expected, actual });
    }
    Ok(())
}
