//! Account health evaluation across the user × pool matrix.
//!
//! Requests are built pools-outer, users-inner, so flat result `i` belongs
//! to pool `i / |users|` and user `i % |users|`.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::CycleError;
use crate::u256_math;
use lendsweep_chain::{BatchCall, BatchCallExecutor, BatchOutput, ChainError, IPool};

/// Health factor of one user in one pool (1e18 = 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthRecord {
    pub user: Address,
    pub pool: Address,
    pub health_factor: U256,
}

impl HealthRecord {
    /// Health factor in (0, 1.0): eligible for liquidation.
    pub fn is_unhealthy(&self) -> bool {
        u256_math::is_unhealthy_wad(self.health_factor)
    }

    /// Health factor as f64 (logging only).
    pub fn health_factor_f64(&self) -> f64 {
        u256_math::wad_to_f64(self.health_factor)
    }
}

/// Result of one health scan.
#[derive(Debug, Clone, Default)]
pub struct HealthScan {
    /// Block the batch was read at
    pub block_number: u64,
    /// Number of (user, pool) entries evaluated
    pub evaluated: usize,
    /// Unhealthy entries in scan order
    pub unhealthy: Vec<HealthRecord>,
}

/// Map a flat result index back to `(pool_index, user_index)`.
#[inline]
pub fn matrix_position(index: usize, user_count: usize) -> (usize, usize) {
    (index / user_count, index % user_count)
}

/// Build one `getUserAccountData` call per (pool, user), pools outer.
pub fn health_calls(users: &[Address], pools: &[Address]) -> Vec<BatchCall> {
    let mut calls = Vec::with_capacity(users.len() * pools.len());
    for &pool in pools {
        for &user in users {
            let data = IPool::getUserAccountDataCall { user }.abi_encode();
            calls.push(BatchCall::new(pool, Bytes::from(data)));
        }
    }
    calls
}

/// Decode every result of a health batch into a [`HealthRecord`].
pub fn decode_health(
    users: &[Address],
    pools: &[Address],
    output: &BatchOutput,
) -> Result<Vec<HealthRecord>, CycleError> {
    let expected = users.len() * pools.len();
    if output.len() != expected {
        return Err(CycleError::HealthBatch(ChainError::BatchLengthMismatch {
            expected,
            actual: output.len(),
        }));
    }

    output
        .return_data
        .iter()
        .enumerate()
        .map(|(index, raw)| -> Result<HealthRecord, CycleError> {
            let decoded = IPool::getUserAccountDataCall::abi_decode_returns(raw, true)?;
            let (pool_index, user_index) = matrix_position(index, users.len());
            Ok(HealthRecord {
                user: users[user_index],
                pool: pools[pool_index],
                health_factor: decoded.healthFactor,
            })
        })
        .collect()
}

/// Fetches health factors for every user in every pool and keeps the
/// unhealthy ones.
pub struct AccountHealthEvaluator {
    executor: Arc<dyn BatchCallExecutor>,
}

impl AccountHealthEvaluator {
    pub fn new(executor: Arc<dyn BatchCallExecutor>) -> Self {
        Self { executor }
    }

    /// Evaluate `users` across `pools` in one batch.
    pub async fn evaluate(
        &self,
        users: &[Address],
        pools: &[Address],
    ) -> Result<HealthScan, CycleError> {
        if users.is_empty() || pools.is_empty() {
            debug!(users = users.len(), pools = pools.len(), "Nothing to evaluate");
            return Ok(HealthScan::default());
        }

        let calls = health_calls(users, pools);
        debug!(calls = calls.len(), "Requesting health factors");

        let output = self
            .executor
            .aggregate(&calls)
            .await
            .map_err(CycleError::HealthBatch)?;

        let records = decode_health(users, pools, &output)?;
        let evaluated = records.len();
        let unhealthy: Vec<HealthRecord> =
            records.into_iter().filter(HealthRecord::is_unhealthy).collect();

        for record in &unhealthy {
            info!(
                user = %record.user,
                pool = %record.pool,
                hf = record.health_factor_f64(),
                "Unhealthy position"
            );
        }
        info!(
            block = output.block_number,
            evaluated,
            unhealthy = unhealthy.len(),
            "Health scan complete"
        );

        Ok(HealthScan {
            block_number: output.block_number,
            evaluated,
            unhealthy,
        })
    }
}
