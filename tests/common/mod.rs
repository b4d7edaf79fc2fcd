#![allow(dead_code)]

use alloy::sol_types::SolEvent;
use alloy_primitives::{Address, B256, Bytes, Log, U256, address};
use async_trait::async_trait;
use clmm_orchestrator::Q96;
use clmm_orchestrator::chain::contracts::INonfungiblePositionManager::IncreaseLiquidity;
use clmm_orchestrator::chain::{Chain, ContractCall, GasSettings, TxReceipt};
use clmm_orchestrator::config::OrchestratorConfig;
use clmm_orchestrator::error::OnchainError;
use clmm_orchestrator::gas::Operation;
use clmm_orchestrator::pool::state::Slot0;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const POOL: Address = address!("0x1000000000000000000000000000000000000000");
pub const TOKEN0: Address = address!("0x0000000000000000000000000000000000000001");
pub const TOKEN1: Address = address!("0x0000000000000000000000000000000000000002");
pub const SIGNER: Address = address!("0x00000000000000000000000000000000000000aa");
pub const MANAGER: Address = address!("0x00000000000000000000000000000000000000cc");
pub const ROUTER: Address = address!("0x00000000000000000000000000000000000000dd");

pub const E16: u64 = 10_000_000_000_000_000;
pub const E17: u64 = 100_000_000_000_000_000;
pub const E18: u64 = 1_000_000_000_000_000_000;

pub struct FakePending {
    hash: B256,
    call: ContractCall,
}

struct Ledger {
    balances: HashMap<(Address, Address), U256>,
    sent: Vec<(ContractCall, GasSettings)>,
    next_token_id: u64,
    next_contract: u8,
}

/// In-memory stand-in for a node with one pool, two tokens and a signer.
///
/// Swaps pay out half of the input amount. Mints emit `IncreaseLiquidity`
/// for exactly the desired amounts.
pub struct FakeChain {
    token0: Address,
    token1: Address,
    fee: u32,
    tick_spacing: i32,
    slot0: Slot0,
    liquidity: u128,
    gas_price: u128,
    emit_mint_event: bool,
    reverting: HashSet<Operation>,
    rejecting: HashSet<Operation>,
    stalling: HashSet<Operation>,
    reads: AtomicUsize,
    ledger: Mutex<Ledger>,
}

impl FakeChain {
    pub fn new() -> Self {
        let mut balances = HashMap::new();
        balances.insert((TOKEN0, SIGNER), U256::from(10 * E18));
        balances.insert((TOKEN1, SIGNER), U256::from(10 * E18));

        Self {
            token0: TOKEN0,
            token1: TOKEN1,
            fee: 3000,
            tick_spacing: 60,
            slot0: Slot0 {
                sqrt_price_x96: Q96,
                tick: 0,
            },
            liquidity: 1_000_000,
            gas_price: 100,
            emit_mint_event: true,
            reverting: HashSet::new(),
            rejecting: HashSet::new(),
            stalling: HashSet::new(),
            reads: AtomicUsize::new(0),
            ledger: Mutex::new(Ledger {
                balances,
                sent: Vec::new(),
                next_token_id: 1,
                next_contract: 0,
            }),
        }
    }

    pub fn with_liquidity(mut self, liquidity: u128) -> Self {
        self.liquidity = liquidity;
        self
    }

    pub fn with_balance(self, token: Address, amount: U256) -> Self {
        self.ledger
            .lock()
            .unwrap()
            .balances
            .insert((token, SIGNER), amount);
        self
    }

    /// The receipt for `operation` comes back with a failed status.
    pub fn reverting_on(mut self, operation: Operation) -> Self {
        self.reverting.insert(operation);
        self
    }

    /// The node refuses to accept `operation`, with revert data.
    pub fn rejecting(mut self, operation: Operation) -> Self {
        self.rejecting.insert(operation);
        self
    }

    /// `operation` never confirms.
    pub fn stalling_on(mut self, operation: Operation) -> Self {
        self.stalling.insert(operation);
        self
    }

    pub fn without_mint_event(mut self) -> Self {
        self.emit_mint_event = false;
        self
    }

    pub fn sent(&self) -> Vec<ContractCall> {
        let ledger = self.ledger.lock().unwrap();
        ledger.sent.iter().map(|(call, _)| call.clone()).collect()
    }

    pub fn sent_gas(&self) -> Vec<GasSettings> {
        let ledger = self.ledger.lock().unwrap();
        ledger.sent.iter().map(|(_, gas)| *gas).collect()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.sent().iter().map(ContractCall::operation).collect()
    }

    /// Number of read requests served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn balance(&self, token: Address) -> U256 {
        let ledger = self.ledger.lock().unwrap();
        ledger
            .balances
            .get(&(token, SIGNER))
            .copied()
            .unwrap_or_default()
    }

    fn read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    fn settle(&self, call: &ContractCall) -> (Vec<Log>, Option<Address>) {
        let mut ledger = self.ledger.lock().unwrap();
        match call {
            ContractCall::ExactInputSingle { params, .. } => {
                let paid = ledger.balances.entry((params.token_in, SIGNER)).or_default();
                *paid = paid.saturating_sub(params.amount_in);
                let got = ledger.balances.entry((params.token_out, SIGNER)).or_default();
                *got += params.amount_in / U256::from(2u64);
                (Vec::new(), None)
            }
            ContractCall::Mint {
                position_manager,
                params,
            } if self.emit_mint_event => {
                let token_id = ledger.next_token_id;
                ledger.next_token_id += 1;
                let event = IncreaseLiquidity {
                    tokenId: U256::from(token_id),
                    liquidity: 1_000,
                    amount0: params.amount0_desired,
                    amount1: params.amount1_desired,
                };
                let log = Log {
                    address: *position_manager,
                    data: event.encode_log_data(),
                };
                (vec![log], None)
            }
            ContractCall::Deploy { .. } => {
                ledger.next_contract += 1;
                (
                    Vec::new(),
                    Some(Address::with_last_byte(0xb0 + ledger.next_contract)),
                )
            }
            _ => (Vec::new(), None),
        }
    }
}

#[async_trait]
impl Chain for FakeChain {
    type Pending = FakePending;

    fn signer(&self) -> Address {
        SIGNER
    }

    async fn token0(&self, _pool: Address) -> Result<Address, OnchainError> {
        self.read();
        Ok(self.token0)
    }

    async fn token1(&self, _pool: Address) -> Result<Address, OnchainError> {
        self.read();
        Ok(self.token1)
    }

    async fn fee(&self, _pool: Address) -> Result<u32, OnchainError> {
        self.read();
        Ok(self.fee)
    }

    async fn tick_spacing(&self, _pool: Address) -> Result<i32, OnchainError> {
        self.read();
        Ok(self.tick_spacing)
    }

    async fn slot0(&self, _pool: Address) -> Result<Slot0, OnchainError> {
        self.read();
        Ok(self.slot0)
    }

    async fn liquidity(&self, _pool: Address) -> Result<u128, OnchainError> {
        self.read();
        Ok(self.liquidity)
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, OnchainError> {
        self.read();
        let ledger = self.ledger.lock().unwrap();
        Ok(ledger
            .balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default())
    }

    async fn gas_price(&self) -> Result<u128, OnchainError> {
        self.read();
        Ok(self.gas_price)
    }

    async fn send(
        &self,
        call: &ContractCall,
        gas: GasSettings,
    ) -> Result<Self::Pending, OnchainError> {
        if self.rejecting.contains(&call.operation()) {
            return Err(OnchainError::FailedToSendTransaction {
                reason: "execution reverted: STF".into(),
                revert_data: Some(Bytes::from_static(&[0x08, 0xc3, 0x79, 0xa0])),
            });
        }

        let mut ledger = self.ledger.lock().unwrap();
        ledger.sent.push((call.clone(), gas));
        let hash = B256::with_last_byte(ledger.sent.len() as u8);
        Ok(FakePending {
            hash,
            call: call.clone(),
        })
    }

    fn pending_hash(pending: &Self::Pending) -> B256 {
        pending.hash
    }

    async fn confirm(&self, pending: Self::Pending) -> Result<TxReceipt, OnchainError> {
        let operation = pending.call.operation();
        if self.stalling.contains(&operation) {
            std::future::pending::<()>().await;
        }

        let success = !self.reverting.contains(&operation);
        let (logs, contract_address) = if success {
            self.settle(&pending.call)
        } else {
            (Vec::new(), None)
        };

        Ok(TxReceipt {
            tx_hash: pending.hash,
            block_number: Some(1),
            success,
            contract_address,
            logs,
        })
    }
}

/// Defaults with every record path under `dir` and a short confirmation
/// timeout.
pub fn config_in(dir: &Path) -> OrchestratorConfig {
    let mut config = OrchestratorConfig::default();
    config.confirmation_timeout_secs = 5;
    config.paths.factory_record = dir.join("deployed-factory.json");
    config.paths.weth9_record = dir.join("weth9-address.json");
    config.paths.pool_record = dir.join("deployed-pool.json");
    config.paths.deployment_record = dir.join("deployed-periphery.json");
    config.paths.position_ledger = dir.join("deployed-positions.json");
    config.paths.artifacts_dir = dir.join("artifacts");
    config
}
