//! Submission of planned liquidations to the per-pool bot contract.

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::error::CycleError;
use crate::planner::LiquidationPlan;
use lendsweep_chain::{ILiquidationBot, TransactionSubmitter, TxOutcome};

/// What happened to a plan handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Sent and confirmed
    Submitted(TxOutcome),
    /// Encoded only
    DryRun { calldata: Bytes },
}

impl DispatchOutcome {
    pub fn tx_outcome(&self) -> Option<&TxOutcome> {
        match self {
            Self::Submitted(outcome) => Some(outcome),
            Self::DryRun { .. } => None,
        }
    }
}

/// Encode `execute(lParam, sParam)` for a plan.
pub fn encode_execute(plan: &LiquidationPlan) -> Bytes {
    let call = ILiquidationBot::executeCall {
        lParam: plan.liquidation_params(),
        sParam: plan.swap_params(),
    };
    Bytes::from(call.abi_encode())
}

/// Sends one liquidation at a time and waits out the cooldown after each.
pub struct LiquidationDispatcher {
    submitter: Arc<dyn TransactionSubmitter>,
    cooldown: Duration,
    dry_run: bool,
}

impl LiquidationDispatcher {
    pub fn new(submitter: Arc<dyn TransactionSubmitter>, cooldown: Duration) -> Self {
        Self {
            submitter,
            cooldown,
            dry_run: false,
        }
    }

    /// Encode and log plans without sending them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Submit `plan` to `bot`, wait for one confirmation, then cool down.
    #[instrument(skip(self, plan), fields(user = %plan.user))]
    pub async fn dispatch(
        &self,
        bot: Address,
        plan: &LiquidationPlan,
    ) -> Result<DispatchOutcome, CycleError> {
        let calldata = encode_execute(plan);

        if self.dry_run {
            warn!(
                %bot,
                collateral = %plan.collateral_asset,
                debt = %plan.debt_asset,
                amount = %plan.seize_amount,
                debt_to_cover = %plan.debt_to_cover,
                calldata = ?calldata,
                "Dry run: liquidation not submitted"
            );
            return Ok(DispatchOutcome::DryRun { calldata });
        }

        info!(
            %bot,
            collateral = %plan.collateral_asset,
            debt = %plan.debt_asset,
            amount = %plan.seize_amount,
            capped = plan.is_capped(),
            "Submitting liquidation"
        );

        let outcome = self
            .submitter
            .submit(bot, calldata)
            .await
            .map_err(|source| CycleError::Liquidation {
                user: plan.user,
                source,
            })?;

        info!(
            tx_hash = %outcome.tx_hash,
            block = ?outcome.block_number,
            gas_used = outcome.gas_used,
            "Liquidation confirmed"
        );

        if !self.cooldown.is_zero() {
            tokio::time::sleep(self.cooldown).await;
        }

        Ok(DispatchOutcome::Submitted(outcome))
    }
}
