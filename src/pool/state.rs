use crate::chain::Chain;
use crate::error::{Error, StateError};
use crate::math::price::is_valid_sqrt_price;
use crate::pool::sort_tokens;
use alloy_primitives::{Address, U256};
use futures::try_join;
use tracing::{debug, warn};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Slot0 {
    pub sqrt_price_x96: U256,
    pub tick: i32,
}

/// Immutable snapshot of a pool, read once per workflow invocation.
///
/// `token0`/`token1` are the pool's own ordering and win over any
/// configured ordering.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoolState {
    pub pool: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
    pub tick: i32,
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
}

/// Configured token order disagreed with what the pool reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TokenOrderMismatch {
    pub configured: (Address, Address),
    pub reported: (Address, Address),
}

impl TokenOrderMismatch {
    /// Same two tokens, only swapped.
    pub fn is_reversal(&self) -> bool {
        sort_tokens(self.configured.0, self.configured.1) == self.reported
    }
}

/// A snapshot together with the token-order signal, if one was raised.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub state: PoolState,
    pub mismatch: Option<TokenOrderMismatch>,
}

/// Compares a configured `(token0, token1)` with the pool's ordering.
pub fn check_token_order(
    configured: (Address, Address),
    state: &PoolState,
) -> Option<TokenOrderMismatch> {
    let reported = (state.token0, state.token1);
    (configured != reported).then_some(TokenOrderMismatch {
        configured,
        reported,
    })
}

pub struct PoolStateReader<'a, C> {
    chain: &'a C,
}

impl<'a, C: Chain> PoolStateReader<'a, C> {
    pub fn new(chain: &'a C) -> Self {
        Self { chain }
    }

    /// Reads tokens, fee, tick spacing, `slot0` and liquidity for `pool`.
    pub async fn read(&self, pool: Address) -> Result<PoolState, Error> {
        let (token0, token1, fee, tick_spacing, slot0, liquidity) = try_join!(
            self.chain.token0(pool),
            self.chain.token1(pool),
            self.chain.fee(pool),
            self.chain.tick_spacing(pool),
            self.chain.slot0(pool),
            self.chain.liquidity(pool),
        )?;

        if tick_spacing <= 0 {
            return Err(StateError::InvalidTickSpacing(tick_spacing).into());
        }
        if slot0.sqrt_price_x96.is_zero() {
            return Err(StateError::PoolNotInitialized(pool).into());
        }
        if !is_valid_sqrt_price(slot0.sqrt_price_x96) {
            return Err(StateError::SqrtPriceOutOfBounds.into());
        }

        let state = PoolState {
            pool,
            token0,
            token1,
            fee,
            tick_spacing,
            tick: slot0.tick,
            sqrt_price_x96: slot0.sqrt_price_x96,
            liquidity,
        };

        debug!(
            %pool,
            %token0,
            %token1,
            fee,
            tick_spacing,
            tick = state.tick,
            sqrt_price_x96 = %state.sqrt_price_x96,
            liquidity,
            "pool state"
        );

        Ok(state)
    }

    /// Like [`read`](Self::read), additionally checking a configured token
    /// order. A mismatch is logged and returned, never raised; the pool's
    /// order is the one in the returned state.
    pub async fn read_checked(
        &self,
        pool: Address,
        expected: Option<(Address, Address)>,
    ) -> Result<PoolSnapshot, Error> {
        let state = self.read(pool).await?;
        let mismatch = expected.and_then(|configured| check_token_order(configured, &state));

        if let Some(mismatch) = &mismatch {
            warn!(
                configured_token0 = %mismatch.configured.0,
                configured_token1 = %mismatch.configured.1,
                pool_token0 = %mismatch.reported.0,
                pool_token1 = %mismatch.reported.1,
                reversed = mismatch.is_reversal(),
                "token order mismatch between pool and config, using the pool order"
            );
        }

        Ok(PoolSnapshot { state, mismatch })
    }
}
