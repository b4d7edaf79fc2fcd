use crate::error::MathError;
use alloy_primitives::U256;
use alloy_primitives::aliases::U512;

/// Computes `floor(a * b / denominator)` with a 512-bit intermediate,
/// returning a `MathError` on division by zero or if the quotient does
/// not fit back into 256 bits.
///
/// Every amount and price derivation in this crate rounds toward zero
/// through this helper.
#[inline]
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    let product = U512::from(a) * U512::from(b);
    let quotient = product / U512::from(denominator);

    narrow(quotient)
}

/// `10^decimals` as a `U256`, the fixed-point scale of a token amount.
pub fn pow10(decimals: u8) -> Result<U256, MathError> {
    // 10^77 is the largest power of ten below 2^256.
    if decimals > 77 {
        return Err(MathError::UnsupportedDecimals(decimals));
    }
    Ok(U256::from(10u64).pow(U256::from(decimals)))
}

/// Narrows a 512-bit intermediate back to 256 bits.
pub(crate) fn narrow(value: U512) -> Result<U256, MathError> {
    let limbs = value.as_limbs();
    if limbs[4..].iter().any(|limb| *limb != 0) {
        return Err(MathError::Overflow);
    }
    Ok(U256::from_limbs_slice(&limbs[..4]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn mul_div_rounds_toward_zero() {
        let result = mul_div(U256::from(10u64), U256::from(10u64), U256::from(3u64)).unwrap();
        assert_eq!(result, U256::from(33u64));
    }

    #[test]
    fn mul_div_handles_intermediate_overflow() {
        // (2^255 * 4) / 8 = 2^254, the product alone does not fit in 256 bits
        let a = U256::ONE << 255;
        let result = mul_div(a, U256::from(4u64), U256::from(8u64)).unwrap();
        assert_eq!(result, U256::ONE << 254);
    }

    #[test]
    fn mul_div_rejects_zero_denominator() {
        let result = mul_div(U256::ONE, U256::ONE, U256::ZERO);
        assert!(matches!(result, Err(MathError::DivisionByZero)));
    }

    #[test]
    fn mul_div_reports_overflow() {
        let result = mul_div(U256::MAX, U256::from(2u64), U256::ONE);
        assert!(matches!(result, Err(MathError::Overflow)));
    }

    #[test]
    fn pow10_scales() {
        assert_eq!(pow10(0).unwrap(), U256::ONE);
        assert_eq!(
            pow10(18).unwrap(),
            U256::from_str("1000000000000000000").unwrap()
        );
        assert!(pow10(77).is_ok());
        assert!(matches!(pow10(78), Err(MathError::UnsupportedDecimals(78))));
    }
}
