//! One complete liquidation sweep.
//!
//! Fetch users, evaluate health across every configured pool, then walk
//! the unhealthy entries in scan order: inspect, plan, dispatch. Any error
//! ends the sweep; users without usable holdings are skipped.

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::config::{PoolConfig, ResolvedDeployment};
use crate::dispatcher::{DispatchOutcome, LiquidationDispatcher};
use crate::error::CycleError;
use crate::health::{AccountHealthEvaluator, HealthRecord};
use crate::inspector::PositionInspector;
use crate::planner::{LiquidationPlan, LiquidationPlanner};
use lendsweep_api::UserSource;
use lendsweep_chain::{BalanceReader, BatchCallExecutor, TransactionSubmitter};

/// A liquidation handled during the sweep.
#[derive(Debug, Clone)]
pub struct LiquidationRecord {
    pub user: Address,
    pub pool: Address,
    pub health_factor: U256,
    pub plan: LiquidationPlan,
    pub outcome: DispatchOutcome,
}

/// Summary of a completed sweep.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    /// Block of the health batch (0 when nothing was evaluated)
    pub block_number: u64,
    pub users_scanned: usize,
    pub pools_scanned: usize,
    pub unhealthy: usize,
    /// Unhealthy entries without both a collateral and a debt holding
    pub skipped: usize,
    pub liquidations: Vec<LiquidationRecord>,
}

impl CycleReport {
    fn new(users_scanned: usize, pools_scanned: usize) -> Self {
        Self {
            started_at: Utc::now(),
            block_number: 0,
            users_scanned,
            pools_scanned,
            unhealthy: 0,
            skipped: 0,
            liquidations: Vec::new(),
        }
    }

    /// Liquidations actually sent on-chain.
    pub fn submitted(&self) -> usize {
        self.liquidations
            .iter()
            .filter(|r| r.outcome.tx_outcome().is_some())
            .count()
    }

    pub fn log_summary(&self) {
        info!(
            started_at = %self.started_at.to_rfc3339(),
            block = self.block_number,
            users = self.users_scanned,
            pools = self.pools_scanned,
            unhealthy = self.unhealthy,
            skipped = self.skipped,
            planned = self.liquidations.len(),
            submitted = self.submitted(),
            "Cycle summary"
        );
    }
}

/// Wires the pipeline stages together for a single run.
pub struct LiquidationCycle {
    deployment: Arc<ResolvedDeployment>,
    users: Arc<dyn UserSource>,
    balances: Arc<dyn BalanceReader>,
    evaluator: AccountHealthEvaluator,
    inspector: PositionInspector,
    planner: LiquidationPlanner,
    dispatcher: LiquidationDispatcher,
}

impl LiquidationCycle {
    pub fn new(
        deployment: Arc<ResolvedDeployment>,
        users: Arc<dyn UserSource>,
        executor: Arc<dyn BatchCallExecutor>,
        balances: Arc<dyn BalanceReader>,
        submitter: Arc<dyn TransactionSubmitter>,
    ) -> Self {
        let planner = LiquidationPlanner::new(
            submitter.address(),
            deployment.contracts.router,
            deployment.contracts.wrapped_native,
            deployment.bot.liquidation_bonus_bps,
        );
        let dispatcher = LiquidationDispatcher::new(submitter, deployment.bot.cooldown())
            .with_dry_run(deployment.bot.dry_run);

        Self {
            evaluator: AccountHealthEvaluator::new(executor.clone()),
            inspector: PositionInspector::new(executor),
            deployment,
            users,
            balances,
            planner,
            dispatcher,
        }
    }

    /// Run one sweep to completion or to the first error.
    pub async fn run(&self) -> Result<CycleReport, CycleError> {
        let started = Instant::now();

        let users = self.users.fetch_users().await?;
        let pools = self.deployment.pool_addresses();
        info!(
            users = users.len(),
            pools = pools.len(),
            dry_run = self.dispatcher.is_dry_run(),
            "Starting liquidation cycle"
        );

        let mut report = CycleReport::new(users.len(), pools.len());
        let scan = self.evaluator.evaluate(&users, &pools).await?;
        report.block_number = scan.block_number;
        report.unhealthy = scan.unhealthy.len();

        for record in &scan.unhealthy {
            let pool = self
                .deployment
                .pool(record.pool)
                .ok_or(CycleError::UnknownPool(record.pool))?;

            match self.process(record, pool).await? {
                Some(liquidation) => report.liquidations.push(liquidation),
                None => report.skipped += 1,
            }
        }

        report.log_summary();
        debug!(elapsed_ms = started.elapsed().as_millis(), "Cycle finished");
        Ok(report)
    }

    /// Inspect, plan and dispatch for one unhealthy entry.
    #[instrument(skip(self, record, pool), fields(user = %record.user, pool = %pool.address))]
    async fn process(
        &self,
        record: &HealthRecord,
        pool: &PoolConfig,
    ) -> Result<Option<LiquidationRecord>, CycleError> {
        let holdings = self.inspector.inspect(record.user, pool).await?;
        let Some((collateral, debt)) = holdings.selection() else {
            debug!(
                collateral = holdings.collateral.len(),
                debt = holdings.debt.len(),
                "No usable holdings, skipping"
            );
            return Ok(None);
        };

        let liquidity = self
            .balances
            .balance_of(collateral.underlying, collateral.bearing_token)
            .await
            .map_err(|source| CycleError::LiquidityRead {
                token: collateral.underlying,
                source,
            })?;

        let plan = self.planner.plan(record.user, &collateral, &debt, liquidity);
        let outcome = self.dispatcher.dispatch(pool.bot, &plan).await?;

        Ok(Some(LiquidationRecord {
            user: record.user,
            pool: pool.address,
            health_factor: record.health_factor,
            plan,
            outcome,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BotConfig, ResolvedContracts, SecretKey, SubgraphConfig};
    use crate::planner::UNLIMITED_DEBT_TO_COVER;
    use crate::testing::{addr, FailingUsers, MockChain, StaticUsers, MOCK_BLOCK};
    use crate::u256_math::WAD;
    use alloy::sol_types::SolCall;
    use lendsweep_chain::{ChainError, ILiquidationBot};

    const C: u8 = 0xC0;
    const D: u8 = 0xD0;

    fn pool_config(n: u8) -> PoolConfig {
        PoolConfig {
            address: addr(n),
            bot: addr(n + 10),
            m_tokens: vec![addr(n + 20)],
            d_tokens: vec![addr(n + 30)],
        }
    }

    fn deployment(pools: Vec<PoolConfig>, dry_run: bool) -> Arc<ResolvedDeployment> {
        Arc::new(ResolvedDeployment {
            rpc_url: "http://localhost:8545".to_string(),
            subgraph_url: "http://localhost:8000".to_string(),
            contracts: ResolvedContracts {
                multicall: addr(0xF0),
                router: addr(0xBB),
                wrapped_native: addr(0xCC),
                oracle: None,
            },
            pools,
            subgraph: SubgraphConfig::default(),
            bot: BotConfig {
                cooldown_ms: 0,
                dry_run,
                ..BotConfig::default()
            },
            signer_key: SecretKey::new("0x00"),
        })
    }

    fn cycle(
        deployment: Arc<ResolvedDeployment>,
        users: Vec<Address>,
        chain: &Arc<MockChain>,
    ) -> LiquidationCycle {
        LiquidationCycle::new(
            deployment,
            Arc::new(StaticUsers(users)),
            chain.clone(),
            chain.clone(),
            chain.clone(),
        )
    }

    /// One pool, user 1 at HF 0.5 holding 1000 collateral and 100 debt.
    fn underwater_setup(liquidity: u64) -> (Arc<MockChain>, PoolConfig) {
        let pool = pool_config(1);
        let chain = MockChain::new();
        chain.set_health(pool.address, addr(100), WAD / U256::from(2u64));
        chain.set_balance(pool.m_tokens[0], addr(100), U256::from(1000u64));
        chain.set_underlying(pool.m_tokens[0], addr(C));
        chain.set_balance(pool.d_tokens[0], addr(100), U256::from(100u64));
        chain.set_underlying(pool.d_tokens[0], addr(D));
        chain.set_balance(addr(C), pool.m_tokens[0], U256::from(liquidity));
        (chain, pool)
    }

    fn submitted_call(chain: &MockChain, index: usize) -> ILiquidationBot::executeCall {
        let submissions = chain.submissions();
        ILiquidationBot::executeCall::abi_decode(&submissions[index].1, true).unwrap()
    }

    #[tokio::test]
    async fn test_all_healthy_issues_nothing() {
        let chain = MockChain::new();
        let pools = vec![pool_config(1), pool_config(2)];
        let users: Vec<Address> = (100..=102).map(addr).collect();
        for pool in &pools {
            for &user in &users {
                chain.set_health(pool.address, user, WAD * U256::from(2u64));
            }
        }

        let report = cycle(deployment(pools, false), users, &chain).run().await.unwrap();

        assert_eq!(report.users_scanned, 3);
        assert_eq!(report.pools_scanned, 2);
        assert_eq!(report.unhealthy, 0);
        assert!(report.liquidations.is_empty());
        assert_eq!(report.block_number, MOCK_BLOCK);
        assert_eq!(chain.batch_count(), 1);
        assert!(chain.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_liquidation_within_liquidity() {
        let (chain, pool) = underwater_setup(2000);
        let bot = pool.bot;

        let report = cycle(deployment(vec![pool], false), vec![addr(100)], &chain)
            .run()
            .await
            .unwrap();

        assert_eq!(report.unhealthy, 1);
        assert_eq!(report.submitted(), 1);

        let plan = &report.liquidations[0].plan;
        assert_eq!(plan.collateral_asset, addr(C));
        assert_eq!(plan.debt_asset, addr(D));
        assert_eq!(plan.user, addr(100));
        assert_eq!(plan.seize_amount, U256::from(110u64));
        assert_eq!(plan.debt_to_cover, UNLIMITED_DEBT_TO_COVER);

        assert_eq!(chain.submissions()[0].0, bot);
        let call = submitted_call(&chain, 0);
        assert_eq!(call.lParam.amount, U256::from(110u64));
        assert_eq!(call.lParam.debtToCover, U256::MAX);
        assert_eq!(call.sParam.receiver, chain.signer());
        assert_eq!(call.sParam.path1, vec![addr(C), addr(D)]);
        assert_eq!(call.sParam.path2, vec![addr(D), addr(0xCC)]);
    }

    #[tokio::test]
    async fn test_liquidation_capped_by_liquidity() {
        let (chain, pool) = underwater_setup(50);

        let report = cycle(deployment(vec![pool], false), vec![addr(100)], &chain)
            .run()
            .await
            .unwrap();

        let plan = &report.liquidations[0].plan;
        assert_eq!(plan.seize_amount, U256::from(50u64));
        assert_eq!(plan.debt_to_cover, U256::from(50u64));

        let call = submitted_call(&chain, 0);
        assert_eq!(call.lParam.amount, U256::from(50u64));
        assert_eq!(call.lParam.debtToCover, U256::from(50u64));
    }

    #[tokio::test]
    async fn test_health_batch_failure_dispatches_nothing() {
        let (chain, pool) = underwater_setup(2000);
        chain.fail_batches();

        let err = cycle(deployment(vec![pool], false), vec![addr(100)], &chain)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, CycleError::HealthBatch(_)));
        assert!(chain.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_user_source_failure() {
        let chain = MockChain::new();
        let cycle = LiquidationCycle::new(
            deployment(vec![pool_config(1)], false),
            Arc::new(FailingUsers),
            chain.clone(),
            chain.clone(),
            chain.clone(),
        );

        let err = cycle.run().await.unwrap_err();
        assert!(matches!(err, CycleError::DataSource(_)));
        assert_eq!(chain.batch_count(), 0);
    }

    #[tokio::test]
    async fn test_user_without_holdings_is_skipped() {
        let (chain, pool) = underwater_setup(2000);
        // Second underwater user with nothing in the pool
        chain.set_health(pool.address, addr(101), WAD / U256::from(3u64));

        let report = cycle(deployment(vec![pool], false), vec![addr(100), addr(101)], &chain)
            .run()
            .await
            .unwrap();

        assert_eq!(report.unhealthy, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.submitted(), 1);
    }

    #[tokio::test]
    async fn test_revert_aborts_remaining_users() {
        let (chain, pool) = underwater_setup(2000);
        chain.set_health(pool.address, addr(101), WAD / U256::from(2u64));
        chain.set_balance(pool.m_tokens[0], addr(101), U256::from(10u64));
        chain.set_balance(pool.d_tokens[0], addr(101), U256::from(5u64));
        chain.fail_submissions();

        let err = cycle(deployment(vec![pool], false), vec![addr(100), addr(101)], &chain)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CycleError::Liquidation { user, source: ChainError::Reverted { .. } } if user == addr(100)
        ));
        assert_eq!(chain.submissions().len(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_plans_without_submitting() {
        let (chain, pool) = underwater_setup(2000);

        let report = cycle(deployment(vec![pool], true), vec![addr(100)], &chain)
            .run()
            .await
            .unwrap();

        assert_eq!(report.liquidations.len(), 1);
        assert_eq!(report.submitted(), 0);
        assert!(matches!(report.liquidations[0].outcome, DispatchOutcome::DryRun { .. }));
        assert!(chain.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_second_pool_routes_to_its_own_bot() {
        let pools = vec![pool_config(1), pool_config(2)];
        let second = pools[1].clone();
        let chain = MockChain::new();
        chain.set_health(pools[0].address, addr(100), WAD * U256::from(2u64));
        chain.set_health(second.address, addr(100), WAD / U256::from(2u64));
        chain.set_balance(second.m_tokens[0], addr(100), U256::from(1000u64));
        chain.set_underlying(second.m_tokens[0], addr(C));
        chain.set_balance(second.d_tokens[0], addr(100), U256::from(100u64));
        chain.set_underlying(second.d_tokens[0], addr(D));
        chain.set_balance(addr(C), second.m_tokens[0], U256::from(2000u64));

        let report = cycle(deployment(pools, false), vec![addr(100)], &chain)
            .run()
            .await
            .unwrap();

        assert_eq!(report.unhealthy, 1);
        assert_eq!(report.liquidations[0].pool, second.address);
        assert_eq!(report.liquidations[0].plan.bearing_token, second.m_tokens[0]);
        assert_eq!(report.liquidations[0].plan.seize_amount, U256::from(110u64));
        assert_eq!(chain.submissions()[0].0, second.bot);
    }

    #[tokio::test]
    async fn test_no_users_skips_evaluation() {
        let chain = MockChain::new();
        let report = cycle(deployment(vec![pool_config(1)], false), Vec::new(), &chain)
            .run()
            .await
            .unwrap();

        assert_eq!(report.users_scanned, 0);
        assert_eq!(chain.batch_count(), 0);
    }
}
