use crate::chain::{Chain, GasSettings};
use crate::error::{Error, MathError};
use std::fmt;
use tracing::info;

/// Category of a submitted transaction, selecting its gas limit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Approval,
    Mint,
    Swap,
    Deploy,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Approval => "approval",
            Operation::Mint => "mint",
            Operation::Swap => "swap",
            Operation::Deploy => "deploy",
        };
        f.write_str(name)
    }
}

/// Fixed per-operation upper bounds, not estimates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GasLimits {
    pub approval: u64,
    pub mint: u64,
    pub swap: u64,
    pub deploy: u64,
}

impl Default for GasLimits {
    fn default() -> Self {
        Self {
            approval: 100_000,
            mint: 1_000_000,
            swap: 500_000,
            deploy: 6_000_000,
        }
    }
}

impl GasLimits {
    pub fn for_operation(&self, operation: Operation) -> u64 {
        match operation {
            Operation::Approval => self.approval,
            Operation::Mint => self.mint,
            Operation::Swap => self.swap,
            Operation::Deploy => self.deploy,
        }
    }
}

/// Escalates the network gas price by a rational multiplier
/// (`numerator / denominator`, 12/10 by default).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GasPolicy {
    numerator: u128,
    denominator: u128,
    limits: GasLimits,
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            numerator: 12,
            denominator: 10,
            limits: GasLimits::default(),
        }
    }
}

impl GasPolicy {
    pub fn new(numerator: u128, denominator: u128, limits: GasLimits) -> Result<Self, MathError> {
        if denominator == 0 {
            return Err(MathError::DivisionByZero);
        }
        Ok(Self {
            numerator,
            denominator,
            limits,
        })
    }

    /// `base * numerator / denominator`, rounded toward zero.
    pub fn escalate(&self, base_price: u128) -> Result<u128, MathError> {
        base_price
            .checked_mul(self.numerator)
            .map(|scaled| scaled / self.denominator)
            .ok_or(MathError::Overflow)
    }

    pub fn gas_limit(&self, operation: Operation) -> u64 {
        self.limits.for_operation(operation)
    }

    /// Reads the current gas price once and fixes the escalated price for
    /// the rest of the workflow invocation.
    pub async fn quote<C: Chain>(&self, chain: &C) -> Result<GasQuote, Error> {
        let base_price = chain.gas_price().await?;
        let gas_price = self.escalate(base_price)?;

        info!(base_price, gas_price, "gas price");

        Ok(GasQuote {
            base_price,
            gas_price,
            limits: self.limits,
        })
    }
}

/// Gas price fixed for one workflow invocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GasQuote {
    pub base_price: u128,
    pub gas_price: u128,
    pub limits: GasLimits,
}

impl GasQuote {
    pub fn settings_for(&self, operation: Operation) -> GasSettings {
        GasSettings {
            gas_price: self.gas_price,
            gas_limit: self.limits.for_operation(operation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalates_by_one_point_two() {
        let policy = GasPolicy::default();
        assert_eq!(policy.escalate(100).unwrap(), 120);
    }

    #[test]
    fn escalation_rounds_toward_zero() {
        let policy = GasPolicy::default();
        // 7 * 12 / 10 = 8.4
        assert_eq!(policy.escalate(7).unwrap(), 8);
        assert_eq!(policy.escalate(0).unwrap(), 0);
    }

    #[test]
    fn escalation_reports_overflow() {
        let policy = GasPolicy::default();
        assert!(matches!(policy.escalate(u128::MAX), Err(MathError::Overflow)));
    }

    #[test]
    fn rejects_zero_denominator() {
        assert!(GasPolicy::new(12, 0, GasLimits::default()).is_err());
    }

    #[test]
    fn default_limits_per_operation() {
        let policy = GasPolicy::default();
        assert_eq!(policy.gas_limit(Operation::Approval), 100_000);
        assert_eq!(policy.gas_limit(Operation::Mint), 1_000_000);
        assert_eq!(policy.gas_limit(Operation::Swap), 500_000);
    }

    #[test]
    fn quote_settings_share_one_price() {
        let quote = GasQuote {
            base_price: 100,
            gas_price: 120,
            limits: GasLimits::default(),
        };
        let approval = quote.settings_for(Operation::Approval);
        let swap = quote.settings_for(Operation::Swap);
        assert_eq!(approval.gas_price, swap.gas_price);
        assert_eq!(approval.gas_limit, 100_000);
        assert_eq!(swap.gas_limit, 500_000);
    }
}
