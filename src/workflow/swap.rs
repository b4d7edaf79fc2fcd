use super::{Failed, PoolTarget};
use crate::chain::{Chain, ContractCall};
use crate::config::OrchestratorConfig;
use crate::error::{Error, MathError};
use crate::math::math_helpers::{mul_div, pow10};
use crate::params::{SwapDirection, deadline_in, swap_parameters};
use crate::submit::TransactionSubmitter;
use alloy_primitives::{Address, B256, U256};
use futures::try_join;
use std::fmt;
use tracing::{info, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SwapState {
    ReadPoolState,
    ValidateLiquidity,
    ApproveToken,
    SubmitSwap,
    AwaitConfirmation,
    ComputeBalanceDelta,
    Done,
}

impl fmt::Display for SwapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Signer balance change caused by one swap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BalanceDelta {
    pub token_in: Address,
    pub token_out: Address,
    /// Decrease of `token_in`.
    pub spent: U256,
    /// Increase of `token_out`.
    pub received: U256,
    /// `spent * 1e18 / received`; `None` when nothing was received.
    pub effective_price: Option<U256>,
}

impl BalanceDelta {
    /// `before` and `after` are `(token_in, token_out)` balances.
    pub fn between(
        token_in: Address,
        token_out: Address,
        before: (U256, U256),
        after: (U256, U256),
    ) -> Result<Self, MathError> {
        let spent = before.0.saturating_sub(after.0);
        let received = after.1.saturating_sub(before.1);
        let effective_price = if received.is_zero() {
            None
        } else {
            Some(mul_div(spent, pow10(18)?, received)?)
        };

        Ok(Self {
            token_in,
            token_out,
            spent,
            received,
            effective_price,
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapOutcome {
    pub direction: SwapDirection,
    pub tx_hash: B256,
    pub delta: BalanceDelta,
}

/// One exact-input swap through the router, in one direction.
pub struct SwapWorkflow<'a, C> {
    chain: &'a C,
    config: &'a OrchestratorConfig,
    target: PoolTarget,
    router: Address,
    direction: SwapDirection,
    state: SwapState,
}

impl<'a, C: Chain> SwapWorkflow<'a, C> {
    pub fn new(
        chain: &'a C,
        config: &'a OrchestratorConfig,
        target: PoolTarget,
        router: Address,
        direction: SwapDirection,
    ) -> Self {
        Self {
            chain,
            config,
            target,
            router,
            direction,
            state: SwapState::ReadPoolState,
        }
    }

    pub fn state(&self) -> SwapState {
        self.state
    }

    pub async fn run(mut self) -> Result<SwapOutcome, Failed<SwapState>> {
        let result = self.execute().await;
        result.map_err(|reason| {
            warn!(
                direction = %self.direction,
                state = %self.state,
                %reason,
                revert_data = ?reason.revert_data(),
                "swap workflow failed"
            );
            Failed {
                state: self.state,
                reason,
            }
        })
    }

    fn enter(&mut self, state: SwapState) {
        self.state = state;
        info!(direction = %self.direction, %state, "swap");
    }

    async fn execute(&mut self) -> Result<SwapOutcome, Error> {
        let chain = self.chain;
        let signer = chain.signer();

        self.enter(SwapState::ReadPoolState);
        let pool = self.target.read(chain).await?;

        self.enter(SwapState::ValidateLiquidity);
        if pool.liquidity == 0 {
            return Err(Error::LiquidityAbsent { pool: pool.pool });
        }
        let amount_in = self.config.swap_amount()?;
        let deadline = deadline_in(self.config.deadline_window());
        let params = swap_parameters(&pool, self.direction, amount_in, signer, deadline);
        let before = try_join!(
            chain.balance_of(params.token_in, signer),
            chain.balance_of(params.token_out, signer),
        )?;
        info!(
            token_in = %params.token_in,
            token_out = %params.token_out,
            balance_in = %before.0,
            balance_out = %before.1,
            "balances before swap"
        );

        self.enter(SwapState::ApproveToken);
        let gas = self.config.gas_policy()?.quote(chain).await?;
        let mut submitter =
            TransactionSubmitter::new(chain, gas, self.config.confirmation_timeout());
        submitter
            .approve(params.token_in, self.router, amount_in)
            .await?;

        self.enter(SwapState::SubmitSwap);
        let in_flight = submitter
            .send(ContractCall::ExactInputSingle {
                router: self.router,
                params,
            })
            .await?;
        let tx_hash = in_flight.tx_hash();

        self.enter(SwapState::AwaitConfirmation);
        in_flight.confirm().await?;

        self.enter(SwapState::ComputeBalanceDelta);
        let after = try_join!(
            chain.balance_of(params.token_in, signer),
            chain.balance_of(params.token_out, signer),
        )?;
        let delta = BalanceDelta::between(params.token_in, params.token_out, before, after)?;
        info!(
            spent = %delta.spent,
            received = %delta.received,
            effective_price = ?delta.effective_price,
            "swap settled"
        );

        self.enter(SwapState::Done);
        Ok(SwapOutcome {
            direction: self.direction,
            tx_hash,
            delta,
        })
    }
}

/// Results of a forward swap and, when enabled, the reverse swap after it.
#[derive(Debug)]
pub struct SwapPairReport {
    pub forward: Result<SwapOutcome, Failed<SwapState>>,
    pub reverse: Option<Result<SwapOutcome, Failed<SwapState>>>,
}

impl SwapPairReport {
    pub fn has_fatal(&self) -> bool {
        let fatal = |result: &Result<SwapOutcome, Failed<SwapState>>| {
            result.as_ref().err().is_some_and(Failed::is_fatal)
        };
        fatal(&self.forward) || self.reverse.as_ref().is_some_and(fatal)
    }
}

/// Runs token0 -> token1, then token1 -> token0 if `config.swap.reverse`.
/// Each direction re-reads the pool and the gas price. A forward swap that
/// reverted or timed out does not stop the reverse one; a fatal failure does.
pub async fn run_swap_pair<C: Chain>(
    chain: &C,
    config: &OrchestratorConfig,
    target: PoolTarget,
    router: Address,
) -> SwapPairReport {
    let forward = SwapWorkflow::new(chain, config, target, router, SwapDirection::Forward)
        .run()
        .await;

    let forward_fatal = forward.as_ref().is_err_and(|failed| failed.is_fatal());
    let reverse = if config.swap.reverse && !forward_fatal {
        Some(
            SwapWorkflow::new(chain, config, target, router, SwapDirection::Reverse)
                .run()
                .await,
        )
    } else {
        None
    };

    SwapPairReport { forward, reverse }
}
