//! Mint and swap parameter derivation.
//!
//! Every derivation returns a fresh immutable value; nothing here performs
//! I/O. The workflows feed a [`PoolState`] snapshot in and submit whatever
//! comes out.

use crate::error::MathError;
use crate::math::amounts::{AmountPair, proportional_amounts};
use crate::math::price::price_ratio;
use crate::math::tick::{full_range_for_spacing, full_range_ticks, narrow_range, validate_range};
use crate::pool::state::PoolState;
use alloy_primitives::{Address, U160, U256};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MintParameters {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub amount0_desired: U256,
    pub amount1_desired: U256,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub recipient: Address,
    pub deadline: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapParameters {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    pub deadline: u64,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
    /// Zero leaves the price unconstrained.
    pub sqrt_price_limit_x96: U160,
}

/// How the mint range is chosen.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum RangeStrategy {
    /// Full range while the pool has no liquidity, narrow otherwise.
    #[default]
    Auto,
    Narrow,
    FullRange,
}

/// The range shape actually used for a mint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RangeKind {
    Narrow,
    FullRange,
}

impl fmt::Display for RangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeKind::Narrow => f.write_str("narrow"),
            RangeKind::FullRange => f.write_str("full-range"),
        }
    }
}

/// Tick bounds plus desired amounts, before they are bound to tokens,
/// recipient and deadline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RangePlan {
    pub kind: RangeKind,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub amounts: AmountPair,
}

/// Canonical full-range bounds for `fee` with `amount` of each token.
pub fn full_range_parameters(fee: u32, amount: U256) -> Result<RangePlan, MathError> {
    let (tick_lower, tick_upper) = full_range_ticks(fee)?;
    Ok(RangePlan {
        kind: RangeKind::FullRange,
        tick_lower,
        tick_upper,
        amounts: AmountPair::equal(amount),
    })
}

/// Resolved sizing inputs for mint derivation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MintSizing {
    pub strategy: RangeStrategy,
    pub decimals: u8,
    /// token0 amount for a narrow range; token1 follows the pool price.
    pub narrow_base_amount: U256,
    /// Amount of each token for a full-range position.
    pub full_range_amount: U256,
}

#[derive(Copy, Clone, Debug)]
pub struct ParameterCalculator {
    sizing: MintSizing,
}

impl ParameterCalculator {
    pub fn new(sizing: MintSizing) -> Self {
        Self { sizing }
    }

    pub fn sizing(&self) -> &MintSizing {
        &self.sizing
    }

    /// Applies the strategy selector to a snapshot. An empty pool always
    /// gets a full-range position because its reserve ratio is undefined.
    pub fn choose_range(&self, state: &PoolState) -> RangeKind {
        match self.sizing.strategy {
            RangeStrategy::FullRange => RangeKind::FullRange,
            _ if state.liquidity == 0 => RangeKind::FullRange,
            RangeStrategy::Narrow | RangeStrategy::Auto => RangeKind::Narrow,
        }
    }

    pub fn range_plan(&self, state: &PoolState) -> Result<RangePlan, MathError> {
        let plan = match self.choose_range(state) {
            RangeKind::Narrow => {
                let (tick_lower, tick_upper) = narrow_range(state.tick, state.tick_spacing)?;
                let ratio = price_ratio(state.sqrt_price_x96, self.sizing.decimals)?;
                let amounts =
                    proportional_amounts(self.sizing.narrow_base_amount, ratio, self.sizing.decimals)?;
                debug!(%ratio, tick_lower, tick_upper, "narrow range around current tick");
                RangePlan {
                    kind: RangeKind::Narrow,
                    tick_lower,
                    tick_upper,
                    amounts,
                }
            }
            RangeKind::FullRange => {
                match full_range_parameters(state.fee, self.sizing.full_range_amount) {
                    Ok(plan) if plan.tick_lower % state.tick_spacing == 0 => plan,
                    // non-standard tier: derive the bounds from the pool's own spacing
                    _ => {
                        let (tick_lower, tick_upper) = full_range_for_spacing(state.tick_spacing)?;
                        RangePlan {
                            kind: RangeKind::FullRange,
                            tick_lower,
                            tick_upper,
                            amounts: AmountPair::equal(self.sizing.full_range_amount),
                        }
                    }
                }
            }
        };

        validate_range(plan.tick_lower, plan.tick_upper, state.tick_spacing)?;
        Ok(plan)
    }

    /// Builds mint parameters against the pool's canonical token order.
    /// Slippage floors are zero.
    pub fn mint_parameters(
        &self,
        state: &PoolState,
        recipient: Address,
        deadline: u64,
    ) -> Result<(RangePlan, MintParameters), MathError> {
        let plan = self.range_plan(state)?;
        let params = MintParameters {
            token0: state.token0,
            token1: state.token1,
            fee: state.fee,
            tick_lower: plan.tick_lower,
            tick_upper: plan.tick_upper,
            amount0_desired: plan.amounts.amount0,
            amount1_desired: plan.amounts.amount1,
            amount0_min: U256::ZERO,
            amount1_min: U256::ZERO,
            recipient,
            deadline,
        };
        Ok((plan, params))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SwapDirection {
    /// token0 -> token1
    Forward,
    /// token1 -> token0
    Reverse,
}

impl SwapDirection {
    pub fn tokens(self, state: &PoolState) -> (Address, Address) {
        match self {
            SwapDirection::Forward => (state.token0, state.token1),
            SwapDirection::Reverse => (state.token1, state.token0),
        }
    }
}

impl fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapDirection::Forward => f.write_str("token0->token1"),
            SwapDirection::Reverse => f.write_str("token1->token0"),
        }
    }
}

/// Exact-input single-pool swap through the pool's fee tier, with no
/// output floor and no price limit.
pub fn swap_parameters(
    state: &PoolState,
    direction: SwapDirection,
    amount_in: U256,
    recipient: Address,
    deadline: u64,
) -> SwapParameters {
    let (token_in, token_out) = direction.tokens(state);
    SwapParameters {
        token_in,
        token_out,
        fee: state.fee,
        recipient,
        deadline,
        amount_in,
        amount_out_minimum: U256::ZERO,
        sqrt_price_limit_x96: U160::ZERO,
    }
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// A deadline `window` from now.
pub fn deadline_in(window: Duration) -> u64 {
    unix_now().saturating_add(window.as_secs())
}
