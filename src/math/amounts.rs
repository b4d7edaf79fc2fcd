use crate::error::MathError;
use crate::math::math_helpers::{mul_div, pow10};
use alloy_primitives::U256;

/// A desired `(amount0, amount1)` pair for a mint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AmountPair {
    pub amount0: U256,
    pub amount1: U256,
}

impl AmountPair {
    pub const fn new(amount0: U256, amount1: U256) -> Self {
        Self { amount0, amount1 }
    }

    /// The same amount of both tokens.
    pub const fn equal(amount: U256) -> Self {
        Self::new(amount, amount)
    }
}

/// `amount0 = base`, `amount1 = base * ratio`, where `ratio` is a price
/// ratio scaled by `10^decimals` (see [`price_ratio`]). The product is
/// rounded toward zero.
///
/// [`price_ratio`]: crate::math::price::price_ratio
pub fn proportional_amounts(
    base_amount: U256,
    scaled_ratio: U256,
    decimals: u8,
) -> Result<AmountPair, MathError> {
    let amount1 = mul_div(base_amount, scaled_ratio, pow10(decimals)?)?;
    Ok(AmountPair::new(base_amount, amount1))
}
