pub mod state;

use alloy_primitives::{Address, U160};

/// Numeric value of an address, the key a factory orders pool tokens by.
#[inline(always)]
pub fn address_to_u160(address: Address) -> U160 {
    address.into()
}

/// `(token0, token1)` as a factory would order them when creating a pool.
///
/// A configured pair that differs from what the pool reports but equals
/// this ordering of the same two tokens is a plain reversal.
pub fn sort_tokens(a: Address, b: Address) -> (Address, Address) {
    if address_to_u160(a) < address_to_u160(b) {
        (a, b)
    } else {
        (b, a)
    }
}
