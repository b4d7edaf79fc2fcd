use crate::error::MathError;

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = -MIN_TICK;

/// Fee tiers (in pips) with the tick spacing the canonical factory
/// enables for them.
pub const FEE_TIER_SPACINGS: [(u32, i32); 4] = [(100, 1), (500, 10), (3000, 60), (10000, 200)];

/// Rounds `tick` down to the nearest multiple of `spacing`.
///
/// The result is always `<= tick`, including for negative ticks
/// (`align_tick(-1, 60) == -60`). `spacing` must be positive.
#[inline]
pub fn align_tick(tick: i32, spacing: i32) -> i32 {
    tick.div_euclid(spacing) * spacing
}

/// Smallest tick usable as a lower bound with the given spacing.
pub fn min_usable_tick(spacing: i32) -> Result<i32, MathError> {
    check_spacing(spacing)?;
    Ok(-align_tick(MAX_TICK, spacing))
}

/// Largest tick usable as an upper bound with the given spacing.
pub fn max_usable_tick(spacing: i32) -> Result<i32, MathError> {
    check_spacing(spacing)?;
    Ok(align_tick(MAX_TICK, spacing))
}

/// Canonical tick spacing for a fee tier.
pub fn tick_spacing_for_fee(fee: u32) -> Result<i32, MathError> {
    FEE_TIER_SPACINGS
        .iter()
        .find(|(tier, _)| *tier == fee)
        .map(|(_, spacing)| *spacing)
        .ok_or(MathError::UnsupportedFeeTier(fee))
}

/// One-spacing-wide range containing `current_tick`:
/// `[align_tick(current), align_tick(current) + spacing]`.
///
/// If the aligned range would cross the usable upper bound it is shifted
/// down by one spacing so both bounds stay valid.
pub fn narrow_range(current_tick: i32, spacing: i32) -> Result<(i32, i32), MathError> {
    check_spacing(spacing)?;
    if !(MIN_TICK..=MAX_TICK).contains(&current_tick) {
        return Err(MathError::TickOutOfBounds(current_tick));
    }

    let max = max_usable_tick(spacing)?;
    let min = min_usable_tick(spacing)?;

    let mut lower = align_tick(current_tick, spacing).max(min);
    if lower + spacing > max {
        lower = max - spacing;
    }
    let range = (lower, lower + spacing);
    validate_range(range.0, range.1, spacing)?;

    Ok(range)
}

/// Full-range bounds for a spacing: the widest multiples of `spacing`
/// inside `[MIN_TICK, MAX_TICK]`.
pub fn full_range_for_spacing(spacing: i32) -> Result<(i32, i32), MathError> {
    Ok((min_usable_tick(spacing)?, max_usable_tick(spacing)?))
}

/// Full-range bounds for a fee tier, e.g. `[-887220, 887220]` for 0.3%.
pub fn full_range_ticks(fee: u32) -> Result<(i32, i32), MathError> {
    full_range_for_spacing(tick_spacing_for_fee(fee)?)
}

/// Checks `lower < upper`, both aligned to `spacing` and inside the tick
/// domain.
pub fn validate_range(lower: i32, upper: i32, spacing: i32) -> Result<(), MathError> {
    check_spacing(spacing)?;
    let aligned = lower % spacing == 0 && upper % spacing == 0;
    let in_bounds = lower >= MIN_TICK && upper <= MAX_TICK;
    if lower >= upper || !aligned || !in_bounds {
        return Err(MathError::InvalidRange {
            lower,
            upper,
            spacing,
        });
    }
    Ok(())
}

#[inline]
fn check_spacing(spacing: i32) -> Result<(), MathError> {
    if spacing <= 0 {
        return Err(MathError::InvalidTickSpacing(spacing));
    }
    Ok(())
}
