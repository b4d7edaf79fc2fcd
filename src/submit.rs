//! Sequential transaction submission from a single signer.
//!
//! A [`TransactionSubmitter`] hands out at most one [`InFlight`] at a time:
//! `send` borrows the submitter mutably until the returned handle is
//! confirmed, so a dependent transaction cannot be sent before its
//! predecessor's receipt is in.

use crate::chain::{Chain, ContractCall, TxReceipt};
use crate::error::{Error, OnchainError};
use crate::gas::{GasQuote, Operation};
use crate::params::unix_now;
use alloy_primitives::{Address, B256, U256};
use std::time::Duration;
use tracing::{error, info};

pub struct TransactionSubmitter<'c, C> {
    chain: &'c C,
    gas: GasQuote,
    confirmation_timeout: Duration,
}

impl<'c, C: Chain> TransactionSubmitter<'c, C> {
    pub fn new(chain: &'c C, gas: GasQuote, confirmation_timeout: Duration) -> Self {
        Self {
            chain,
            gas,
            confirmation_timeout,
        }
    }

    pub fn gas(&self) -> &GasQuote {
        &self.gas
    }

    /// Sends `call` and returns the handle to await. Deadlines must still
    /// be in the future at this point.
    pub async fn send(&mut self, call: ContractCall) -> Result<InFlight<'_, 'c, C>, Error> {
        if let Some(deadline) = call.deadline() {
            let now = unix_now();
            if deadline <= now {
                return Err(Error::DeadlineExpired { deadline, now });
            }
        }

        let operation = call.operation();
        let settings = self.gas.settings_for(operation);

        let pending = self
            .chain
            .send(&call, settings)
            .await
            .map_err(|err| match err {
                OnchainError::FailedToSendTransaction {
                    reason,
                    revert_data,
                } => {
                    error!(%operation, %reason, revert_data = ?revert_data, "transaction rejected");
                    Error::TransactionReverted {
                        tx_hash: None,
                        reason,
                        revert_data,
                    }
                }
                other => other.into(),
            })?;

        let tx_hash = C::pending_hash(&pending);
        info!(
            %operation,
            %tx_hash,
            gas_price = settings.gas_price,
            gas_limit = settings.gas_limit,
            "transaction sent"
        );

        Ok(InFlight {
            submitter: self,
            pending,
            tx_hash,
            operation,
        })
    }

    /// `send` followed by `confirm`.
    pub async fn submit(&mut self, call: ContractCall) -> Result<TxReceipt, Error> {
        self.send(call).await?.confirm().await
    }

    /// Approves `spender` for `amount` of `token` and waits for the
    /// allowance to be committed.
    pub async fn approve(
        &mut self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxReceipt, Error> {
        let receipt = self
            .submit(ContractCall::Approve {
                token,
                spender,
                amount,
            })
            .await?;
        info!(%token, %spender, %amount, "approved");
        Ok(receipt)
    }
}

/// A sent transaction awaiting its receipt.
pub struct InFlight<'s, 'c, C: Chain> {
    submitter: &'s mut TransactionSubmitter<'c, C>,
    pending: C::Pending,
    tx_hash: B256,
    operation: Operation,
}

impl<C: Chain> InFlight<'_, '_, C> {
    pub fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    /// Waits for inclusion, bounded by the submitter's confirmation
    /// timeout. A receipt with a failed status is a revert.
    pub async fn confirm(self) -> Result<TxReceipt, Error> {
        let Self {
            submitter,
            pending,
            tx_hash,
            operation,
        } = self;
        let timeout = submitter.confirmation_timeout;

        let receipt = tokio::time::timeout(timeout, submitter.chain.confirm(pending))
            .await
            .map_err(|_| Error::ConfirmationTimeout {
                tx_hash,
                timeout_secs: timeout.as_secs(),
            })??;

        if !receipt.success {
            error!(%operation, %tx_hash, block = ?receipt.block_number, "transaction reverted");
            return Err(Error::TransactionReverted {
                tx_hash: Some(tx_hash),
                reason: format!("{operation} transaction reverted on-chain"),
                revert_data: None,
            });
        }

        info!(%operation, %tx_hash, block = ?receipt.block_number, "transaction confirmed");
        Ok(receipt)
    }
}
