//! Per-user position discovery within one pool.
//!
//! Each configured bearing token is probed with a `balanceOf(user)` and an
//! `UNDERLYING_ASSET_ADDRESS()` call. The two calls for a token are always
//! adjacent in the batch; [`probe_calls`] and [`decode_probes`] are the only
//! places that know this layout.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::config::PoolConfig;
use crate::error::CycleError;
use lendsweep_chain::{BatchCall, BatchCallExecutor, BatchOutput, ChainError, IMToken};

/// Calls issued per probed token.
const CALLS_PER_PROBE: usize = 2;

/// Which side of the position a bearing token represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSide {
    Collateral,
    Debt,
}

/// One bearing token to probe for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenProbe {
    pub token: Address,
    pub side: TokenSide,
}

/// Decoded answer for one [`TokenProbe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenReading {
    pub token: Address,
    pub side: TokenSide,
    pub balance: U256,
    pub underlying: Address,
}

/// Nonzero collateral position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollateralHolding {
    /// Collateral-bearing token contract
    pub bearing_token: Address,
    /// Underlying collateral asset
    pub underlying: Address,
    pub amount: U256,
}

/// Nonzero debt position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebtHolding {
    pub underlying: Address,
    pub amount: U256,
}

/// Everything a user holds in one pool, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct Holdings {
    pub collateral: SmallVec<[CollateralHolding; 4]>,
    pub debt: SmallVec<[DebtHolding; 4]>,
}

impl Holdings {
    /// First collateral and first debt holding, if both sides are present.
    ///
    /// Later holdings are ignored even when larger.
    pub fn selection(&self) -> Option<(CollateralHolding, DebtHolding)> {
        Some((*self.collateral.first()?, *self.debt.first()?))
    }

    pub fn is_empty(&self) -> bool {
        self.collateral.is_empty() && self.debt.is_empty()
    }
}

/// Probes for a pool: collateral tokens first, then debt tokens.
pub fn pool_probes(pool: &PoolConfig) -> Vec<TokenProbe> {
    let collateral = pool.m_tokens.iter().map(|&token| TokenProbe {
        token,
        side: TokenSide::Collateral,
    });
    let debt = pool.d_tokens.iter().map(|&token| TokenProbe {
        token,
        side: TokenSide::Debt,
    });
    collateral.chain(debt).collect()
}

/// Build the paired calls for every probe.
pub fn probe_calls(user: Address, probes: &[TokenProbe]) -> Vec<BatchCall> {
    let balance = Bytes::from(IMToken::balanceOfCall { user }.abi_encode());
    let underlying = Bytes::from(IMToken::UNDERLYING_ASSET_ADDRESSCall {}.abi_encode());

    probes
        .iter()
        .flat_map(|probe| {
            [
                BatchCall::new(probe.token, balance.clone()),
                BatchCall::new(probe.token, underlying.clone()),
            ]
        })
        .collect()
}

/// Decode a probe batch back into one reading per probe.
pub fn decode_probes(
    probes: &[TokenProbe],
    output: &BatchOutput,
) -> Result<Vec<TokenReading>, ChainError> {
    let expected = probes.len() * CALLS_PER_PROBE;
    if output.len() != expected {
        return Err(ChainError::BatchLengthMismatch {
            expected,
            actual: output.len(),
        });
    }

    probes
        .iter()
        .zip(output.return_data.chunks_exact(CALLS_PER_PROBE))
        .map(|(probe, pair)| -> Result<TokenReading, ChainError> {
            let balance = IMToken::balanceOfCall::abi_decode_returns(&pair[0], true)?._0;
            let underlying =
                IMToken::UNDERLYING_ASSET_ADDRESSCall::abi_decode_returns(&pair[1], true)?._0;
            Ok(TokenReading {
                token: probe.token,
                side: probe.side,
                balance,
                underlying,
            })
        })
        .collect()
}

/// Keep nonzero readings, split by side.
pub fn holdings_from(readings: &[TokenReading]) -> Holdings {
    let mut holdings = Holdings::default();
    for reading in readings.iter().filter(|r| !r.balance.is_zero()) {
        match reading.side {
            TokenSide::Collateral => holdings.collateral.push(CollateralHolding {
                bearing_token: reading.token,
                underlying: reading.underlying,
                amount: reading.balance,
            }),
            TokenSide::Debt => holdings.debt.push(DebtHolding {
                underlying: reading.underlying,
                amount: reading.balance,
            }),
        }
    }
    holdings
}

/// Reads a user's bearing-token balances in one pool.
pub struct PositionInspector {
    executor: Arc<dyn BatchCallExecutor>,
}

impl PositionInspector {
    pub fn new(executor: Arc<dyn BatchCallExecutor>) -> Self {
        Self { executor }
    }

    #[instrument(skip(self, pool), fields(pool = %pool.address))]
    pub async fn inspect(&self, user: Address, pool: &PoolConfig) -> Result<Holdings, CycleError> {
        let probes = pool_probes(pool);
        if probes.is_empty() {
            return Ok(Holdings::default());
        }

        let calls = probe_calls(user, &probes);
        let readings = self
            .executor
            .aggregate(&calls)
            .await
            .and_then(|output| decode_probes(&probes, &output))
            .map_err(|source| CycleError::InspectionBatch { user, source })?;

        let holdings = holdings_from(&readings);
        debug!(
            collateral = holdings.collateral.len(),
            debt = holdings.debt.len(),
            "Position inspected"
        );
        Ok(holdings)
    }
}
