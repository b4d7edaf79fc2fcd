use crate::chain::Chain;
use crate::error::Error;
use alloy_primitives::{Address, U256};
use futures::future::try_join_all;
use tracing::info;

/// An amount of `token` the signer must hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Requirement {
    pub token: Address,
    pub required: U256,
}

impl Requirement {
    pub const fn new(token: Address, required: U256) -> Self {
        Self { token, required }
    }
}

/// `InsufficientBalance` unless `available >= required`.
pub fn check(requirement: &Requirement, available: U256) -> Result<(), Error> {
    if available < requirement.required {
        return Err(Error::InsufficientBalance {
            token: requirement.token,
            required: requirement.required,
            available,
        });
    }
    Ok(())
}

pub struct BalanceValidator<'a, C> {
    chain: &'a C,
}

impl<'a, C: Chain> BalanceValidator<'a, C> {
    pub fn new(chain: &'a C) -> Self {
        Self { chain }
    }

    /// Reads every balance fresh and fails on the first shortfall, in
    /// requirement order. Returns the balances that were read.
    pub async fn ensure(
        &self,
        owner: Address,
        requirements: &[Requirement],
    ) -> Result<Vec<U256>, Error> {
        let balances = try_join_all(
            requirements
                .iter()
                .map(|requirement| self.chain.balance_of(requirement.token, owner)),
        )
        .await?;

        for (requirement, available) in requirements.iter().zip(&balances) {
            info!(
                token = %requirement.token,
                required = %requirement.required,
                available = %available,
                "balance"
            );
            check(requirement, *available)?;
        }

        Ok(balances)
    }
}
