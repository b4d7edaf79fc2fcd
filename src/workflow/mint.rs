use super::{Failed, PoolTarget};
use crate::balance::{BalanceValidator, Requirement};
use crate::chain::{Chain, ContractCall};
use crate::config::OrchestratorConfig;
use crate::error::Error;
use crate::events::extract_increase_liquidity;
use crate::ledger::{PositionLedger, PositionRecord};
use crate::params::{ParameterCalculator, RangeKind, deadline_in};
use crate::submit::TransactionSubmitter;
use alloy_primitives::{Address, B256};
use std::fmt;
use tracing::{info, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MintState {
    ReadPoolState,
    ComputeParameters,
    ValidateBalances,
    ApproveTokens,
    SubmitMint,
    AwaitConfirmation,
    ExtractEvent,
    PersistPosition,
    Done,
}

impl fmt::Display for MintState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MintOutcome {
    /// The position was minted and appended to the ledger.
    Recorded {
        record: PositionRecord,
        range: RangeKind,
        ledger_len: usize,
        tx_hash: B256,
    },
    /// The mint confirmed but its receipt carried no `IncreaseLiquidity`
    /// event, so nothing was persisted.
    EventNotFound { tx_hash: B256 },
}

/// Adds liquidity to one pool and records the resulting position.
pub struct MintWorkflow<'a, C> {
    chain: &'a C,
    config: &'a OrchestratorConfig,
    target: PoolTarget,
    position_manager: Address,
    ledger: &'a PositionLedger,
    state: MintState,
}

impl<'a, C: Chain> MintWorkflow<'a, C> {
    pub fn new(
        chain: &'a C,
        config: &'a OrchestratorConfig,
        target: PoolTarget,
        position_manager: Address,
        ledger: &'a PositionLedger,
    ) -> Self {
        Self {
            chain,
            config,
            target,
            position_manager,
            ledger,
            state: MintState::ReadPoolState,
        }
    }

    pub fn state(&self) -> MintState {
        self.state
    }

    pub async fn run(mut self) -> Result<MintOutcome, Failed<MintState>> {
        let result = self.execute().await;
        result.map_err(|reason| {
            warn!(state = %self.state, %reason, "mint workflow failed");
            Failed {
                state: self.state,
                reason,
            }
        })
    }

    fn enter(&mut self, state: MintState) {
        self.state = state;
        info!(%state, "mint");
    }

    async fn execute(&mut self) -> Result<MintOutcome, Error> {
        let chain = self.chain;
        let signer = chain.signer();
        let manager = self.position_manager;

        self.enter(MintState::ReadPoolState);
        let pool = self.target.read(chain).await?;
        if pool.liquidity == 0 {
            info!(pool = %pool.pool, "pool has no liquidity yet, this mint seeds it");
        } else {
            info!(pool = %pool.pool, liquidity = pool.liquidity, "pool already has liquidity");
        }

        self.enter(MintState::ComputeParameters);
        let calculator = ParameterCalculator::new(self.config.mint_sizing()?);
        let deadline = deadline_in(self.config.deadline_window());
        let (plan, params) = calculator.mint_parameters(&pool, signer, deadline)?;
        info!(
            range = %plan.kind,
            tick_lower = params.tick_lower,
            tick_upper = params.tick_upper,
            amount0 = %params.amount0_desired,
            amount1 = %params.amount1_desired,
            deadline,
            "mint parameters"
        );

        self.enter(MintState::ValidateBalances);
        BalanceValidator::new(chain)
            .ensure(
                signer,
                &[
                    Requirement::new(params.token0, params.amount0_desired),
                    Requirement::new(params.token1, params.amount1_desired),
                ],
            )
            .await?;

        self.enter(MintState::ApproveTokens);
        let gas = self.config.gas_policy()?.quote(chain).await?;
        let mut submitter =
            TransactionSubmitter::new(chain, gas, self.config.confirmation_timeout());
        submitter
            .approve(params.token0, manager, params.amount0_desired)
            .await?;
        submitter
            .approve(params.token1, manager, params.amount1_desired)
            .await?;

        self.enter(MintState::SubmitMint);
        let in_flight = submitter
            .send(ContractCall::Mint {
                position_manager: manager,
                params,
            })
            .await?;
        let tx_hash = in_flight.tx_hash();

        self.enter(MintState::AwaitConfirmation);
        let receipt = in_flight.confirm().await?;

        self.enter(MintState::ExtractEvent);
        let minted = match extract_increase_liquidity(&receipt, manager) {
            Ok(minted) => minted,
            Err(not_found) => {
                self.enter(MintState::Done);
                return Ok(MintOutcome::EventNotFound {
                    tx_hash: not_found.tx_hash,
                });
            }
        };
        info!(
            token_id = %minted.token_id,
            liquidity = minted.liquidity,
            amount0 = %minted.amount0,
            amount1 = %minted.amount1,
            "position minted"
        );

        self.enter(MintState::PersistPosition);
        let record = PositionRecord::from_mint(&params, &minted);
        let ledger_len = self.ledger.append(record.clone())?;

        self.enter(MintState::Done);
        Ok(MintOutcome::Recorded {
            record,
            range: plan.kind,
            ledger_len,
            tx_hash,
        })
    }
}
