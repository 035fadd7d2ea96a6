//! In-memory chain and indexer doubles for pipeline tests.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use lendsweep_api::{SubgraphError, UserSource};
use lendsweep_chain::{
    BalanceReader, BatchCall, BatchCallExecutor, BatchOutput, ChainError, IMToken, IPool,
    TransactionSubmitter, TxOutcome,
};

pub const MOCK_BLOCK: u64 = 100;

pub fn addr(n: u8) -> Address {
    Address::repeat_byte(n)
}

#[derive(Default)]
struct State {
    health: HashMap<(Address, Address), U256>,
    balances: HashMap<(Address, Address), U256>,
    underlying: HashMap<Address, Address>,
    fail_batches: bool,
    fail_submissions: bool,
}

/// Answers batch reads from in-memory state and records submissions.
pub struct MockChain {
    state: Mutex<State>,
    batches: Mutex<Vec<Vec<BatchCall>>>,
    submissions: Mutex<Vec<(Address, Bytes)>>,
    signer: Address,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State::default()),
            batches: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            signer: addr(0xAA),
        })
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    pub fn set_health(&self, pool: Address, user: Address, hf: U256) {
        self.state.lock().health.insert((pool, user), hf);
    }

    pub fn set_balance(&self, token: Address, holder: Address, amount: U256) {
        self.state.lock().balances.insert((token, holder), amount);
    }

    pub fn set_underlying(&self, token: Address, asset: Address) {
        self.state.lock().underlying.insert(token, asset);
    }

    pub fn fail_batches(&self) {
        self.state.lock().fail_batches = true;
    }

    pub fn fail_submissions(&self) {
        self.state.lock().fail_submissions = true;
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().len()
    }

    pub fn submissions(&self) -> Vec<(Address, Bytes)> {
        self.submissions.lock().clone()
    }

    fn answer(state: &State, call: &BatchCall) -> Result<Bytes, ChainError> {
        let data = call.call_data.as_ref();
        if data.len() < 4 {
            return Err(ChainError::Rpc("empty calldata".to_string()));
        }
        let selector = &data[..4];

        let encoded = if selector == IPool::getUserAccountDataCall::SELECTOR {
            let user = IPool::getUserAccountDataCall::abi_decode(data, true)?.user;
            let hf = state
                .health
                .get(&(call.target, user))
                .copied()
                .unwrap_or_default();
            (U256::ZERO, U256::ZERO, U256::ZERO, U256::ZERO, U256::ZERO, hf).abi_encode()
        } else if selector == IMToken::balanceOfCall::SELECTOR {
            let user = IMToken::balanceOfCall::abi_decode(data, true)?.user;
            state
                .balances
                .get(&(call.target, user))
                .copied()
                .unwrap_or_default()
                .abi_encode()
        } else if selector == IMToken::UNDERLYING_ASSET_ADDRESSCall::SELECTOR {
            state
                .underlying
                .get(&call.target)
                .copied()
                .unwrap_or_default()
                .abi_encode()
        } else {
            return Err(ChainError::Rpc("execution reverted".to_string()));
        };

        Ok(Bytes::from(encoded))
    }
}

#[async_trait]
impl BatchCallExecutor for MockChain {
    async fn aggregate(&self, calls: &[BatchCall]) -> Result<BatchOutput, ChainError> {
        self.batches.lock().push(calls.to_vec());

        let state = self.state.lock();
        if state.fail_batches {
            return Err(ChainError::Rpc("execution reverted".to_string()));
        }

        let return_data = calls
            .iter()
            .map(|call| Self::answer(&state, call))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BatchOutput {
            block_number: MOCK_BLOCK,
            return_data,
        })
    }
}

#[async_trait]
impl BalanceReader for MockChain {
    async fn balance_of(&self, token: Address, holder: Address) -> Result<U256, ChainError> {
        Ok(self
            .state
            .lock()
            .balances
            .get(&(token, holder))
            .copied()
            .unwrap_or_default())
    }
}

#[async_trait]
impl TransactionSubmitter for MockChain {
    fn address(&self) -> Address {
        self.signer
    }

    async fn submit(&self, to: Address, calldata: Bytes) -> Result<TxOutcome, ChainError> {
        let count = {
            let mut submissions = self.submissions.lock();
            submissions.push((to, calldata));
            submissions.len()
        };

        if self.state.lock().fail_submissions {
            return Err(ChainError::Reverted {
                tx_hash: B256::repeat_byte(0xEE),
            });
        }

        Ok(TxOutcome {
            tx_hash: B256::with_last_byte(count as u8),
            block_number: Some(MOCK_BLOCK + 1),
            gas_used: 500_000,
        })
    }
}

/// Fixed user list.
pub struct StaticUsers(pub Vec<Address>);

#[async_trait]
impl UserSource for StaticUsers {
    async fn fetch_users(&self) -> Result<Vec<Address>, SubgraphError> {
        Ok(self.0.clone())
    }
}

/// Indexer that always fails.
pub struct FailingUsers;

#[async_trait]
impl UserSource for FailingUsers {
    async fn fetch_users(&self) -> Result<Vec<Address>, SubgraphError> {
        Err(SubgraphError::Query("indexer unavailable".to_string()))
    }
}
