use alloy_primitives::{Address, U256};
use clmm_orchestrator::math::amounts::proportional_amounts;
use clmm_orchestrator::math::price::price_ratio;
use clmm_orchestrator::math::tick::{align_tick, narrow_range};
use clmm_orchestrator::params::{MintSizing, ParameterCalculator, RangeStrategy};
use clmm_orchestrator::{PoolState, Q96};
use criterion::{Criterion, black_box};

fn pool(liquidity: u128) -> PoolState {
    PoolState {
        pool: Address::ZERO,
        token0: Address::with_last_byte(1),
        token1: Address::with_last_byte(2),
        fee: 3000,
        tick_spacing: 60,
        tick: -12_345,
        sqrt_price_x96: Q96 * U256::from(3u64) / U256::from(2u64),
        liquidity,
    }
}

pub fn bench_tick_alignment(c: &mut Criterion) {
    c.bench_function("align_tick", |b| {
        b.iter(|| align_tick(black_box(-12_345), black_box(60)))
    });
    c.bench_function("narrow_range", |b| {
        b.iter(|| narrow_range(black_box(887_250), black_box(60)))
    });
}

pub fn bench_price_ratio(c: &mut Criterion) {
    let sqrt_price = Q96 * U256::from(3u64) / U256::from(2u64);
    c.bench_function("price_ratio", |b| {
        b.iter(|| price_ratio(black_box(sqrt_price), black_box(18)))
    });

    let ratio = U256::from(2_250_000_000_000_000_000u64);
    let base = U256::from(10_000_000_000_000_000u64);
    c.bench_function("proportional_amounts", |b| {
        b.iter(|| proportional_amounts(black_box(base), black_box(ratio), 18))
    });
}

pub fn bench_mint_parameters(c: &mut Criterion) {
    let calculator = ParameterCalculator::new(MintSizing {
        strategy: RangeStrategy::Auto,
        decimals: 18,
        narrow_base_amount: U256::from(10_000_000_000_000_000u64),
        full_range_amount: U256::from(100_000_000_000_000_000u64),
    });
    let live = pool(1_000_000);
    let empty = pool(0);

    c.bench_function("mint_parameters_narrow", |b| {
        b.iter(|| calculator.mint_parameters(black_box(&live), Address::ZERO, 0))
    });
    c.bench_function("mint_parameters_full_range", |b| {
        b.iter(|| calculator.mint_parameters(black_box(&empty), Address::ZERO, 0))
    });
}
