//! Off-chain orchestration for Uniswap V3–style concentrated liquidity pools.
//!
//! This crate exposes:
//! - Pure parameter math (`math::*`) for tick alignment, price ratios and
//!   position amounts.
//! - A `Chain` seam with an alloy-backed implementation (`chain::RpcChain`)
//!   for pool reads and transaction submission.
//! - The mint and swap workflows (`workflow::*`) that sequence pool reads,
//!   balance checks, gas-escalated submission, event extraction and the
//!   append-only position ledger.
//!
//! # Examples
//!
//! ## Pure math
//! ```
//! use clmm_orchestrator::{math::price::price_ratio, math::tick::align_tick, Q96};
//!
//! assert_eq!(align_tick(-1, 60), -60);
//! assert_eq!(price_ratio(Q96, 18).unwrap(), clmm_orchestrator::U256::from(10u64).pow(clmm_orchestrator::U256::from(18u64)));
//! ```
//!
//! ## Adding liquidity against a live node
//! ```no_run
//! # async fn run() -> Result<(), clmm_orchestrator::error::Error> {
//! use std::sync::Arc;
//! use alloy::providers::ProviderBuilder;
//! use clmm_orchestrator::{
//!     chain::RpcChain, config::OrchestratorConfig, ledger::PositionLedger,
//!     workflow::{mint::MintWorkflow, PoolTarget},
//! };
//!
//! let config = OrchestratorConfig::default();
//! # let signer = clmm_orchestrator::Address::ZERO;
//! # let position_manager = clmm_orchestrator::Address::ZERO;
//! # let target = PoolTarget::new(clmm_orchestrator::Address::ZERO, None);
//! let provider = ProviderBuilder::new().connect_http("http://127.0.0.1:8545".parse().unwrap());
//! let chain = RpcChain::new(Arc::new(provider), signer);
//! let ledger = PositionLedger::new(&config.paths.position_ledger);
//!
//! let workflow = MintWorkflow::new(&chain, &config, target, position_manager, &ledger);
//! let outcome = workflow.run().await.map_err(|failed| failed.reason)?;
//! println!("{outcome:?}");
//! # Ok(()) }
//! ```

pub use alloy_primitives::{Address, B256, Bytes, U160, U256};

pub mod balance;
pub mod chain;
pub mod config;
pub mod deploy;
pub mod error;
pub mod events;
pub mod gas;
pub mod ledger;
pub mod math;
pub mod params;
pub mod pool;
pub mod records;
pub mod submit;
pub mod workflow;

pub use chain::{Chain, RpcChain};
pub use pool::state::{PoolState, PoolStateReader};

pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);
