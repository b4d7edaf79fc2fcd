use crate::error::MathError;
use crate::math::math_helpers::{narrow, pow10};
use alloy_primitives::U256;
use alloy_primitives::aliases::U512;

pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([6743328256752651558, 17280870778742802505, 4294805859, 0]);

/// Returns `(sqrt_price_x96 / 2^96)^2`, the token1-per-token0 price, as a
/// fixed-point integer scaled by `10^decimals` and rounded toward zero.
///
/// `price_ratio(Q96, d)` is exactly `10^d` (a ratio of one) and
/// `price_ratio(0, d)` is zero.
pub fn price_ratio(sqrt_price_x96: U256, decimals: u8) -> Result<U256, MathError> {
    let scale = pow10(decimals)?;
    if sqrt_price_x96.is_zero() {
        return Ok(U256::ZERO);
    }

    // one division by 2^192 so the scaled price is floored exactly once
    let squared = U512::from(sqrt_price_x96) * U512::from(sqrt_price_x96);
    let scaled = squared
        .checked_mul(U512::from(scale))
        .ok_or(MathError::Overflow)?;
    narrow(scaled >> 192)
}

/// Whether `sqrt_price_x96` lies in the range a live pool can report.
#[inline]
pub fn is_valid_sqrt_price(sqrt_price_x96: U256) -> bool {
    sqrt_price_x96 >= MIN_SQRT_RATIO && sqrt_price_x96 < MAX_SQRT_RATIO
}
