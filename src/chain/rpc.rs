use super::contracts::{IERC20, IUniswapV3Pool};
use super::{Chain, ContractCall, GasSettings, TxReceipt};
use crate::error::OnchainError;
use crate::pool::state::Slot0;
use alloy::network::{Ethereum, TransactionBuilder};
use alloy::providers::{PendingTransactionBuilder, Provider};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportError;
use alloy_primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub type OnchainProvider<P> = Arc<P>;

/// [`Chain`] over an alloy provider whose wallet holds the signer key.
#[derive(Clone, Debug)]
pub struct RpcChain<P> {
    provider: OnchainProvider<P>,
    signer: Address,
}

impl<P> RpcChain<P>
where
    P: Provider + Send + Sync + 'static,
{
    pub fn new(provider: OnchainProvider<P>, signer: Address) -> Self {
        Self { provider, signer }
    }

    pub fn provider(&self) -> &OnchainProvider<P> {
        &self.provider
    }

    fn pool(&self, pool: Address) -> IUniswapV3Pool::IUniswapV3PoolInstance<OnchainProvider<P>> {
        IUniswapV3Pool::new(pool, self.provider.clone())
    }
}

/// Revert payload attached to a JSON-RPC error response, if any.
fn revert_data(err: &TransportError) -> Option<Bytes> {
    err.as_error_resp()
        .and_then(|payload| payload.as_revert_data())
}

#[async_trait]
impl<P> Chain for RpcChain<P>
where
    P: Provider + Send + Sync + 'static,
{
    type Pending = PendingTransactionBuilder<Ethereum>;

    fn signer(&self) -> Address {
        self.signer
    }

    async fn token0(&self, pool: Address) -> Result<Address, OnchainError> {
        self.pool(pool)
            .token0()
            .call()
            .await
            .map_err(|e| OnchainError::FailedToGetToken0(e.to_string()))
    }

    async fn token1(&self, pool: Address) -> Result<Address, OnchainError> {
        self.pool(pool)
            .token1()
            .call()
            .await
            .map_err(|e| OnchainError::FailedToGetToken1(e.to_string()))
    }

    async fn fee(&self, pool: Address) -> Result<u32, OnchainError> {
        let fee = self
            .pool(pool)
            .fee()
            .call()
            .await
            .map_err(|e| OnchainError::FailedToGetFee(e.to_string()))?;

        Ok(fee.to::<u32>())
    }

    async fn tick_spacing(&self, pool: Address) -> Result<i32, OnchainError> {
        let tick_spacing = self
            .pool(pool)
            .tickSpacing()
            .call()
            .await
            .map_err(|e| OnchainError::FailedToGetTickSpacing(e.to_string()))?;

        Ok(tick_spacing.as_i32())
    }

    async fn slot0(&self, pool: Address) -> Result<Slot0, OnchainError> {
        let slot0 = self
            .pool(pool)
            .slot0()
            .call()
            .await
            .map_err(|e| OnchainError::FailedToGetSlot0(e.to_string()))?;

        Ok(Slot0 {
            sqrt_price_x96: U256::from(slot0.sqrtPriceX96),
            tick: slot0.tick.as_i32(),
        })
    }

    async fn liquidity(&self, pool: Address) -> Result<u128, OnchainError> {
        self.pool(pool)
            .liquidity()
            .call()
            .await
            .map_err(|e| OnchainError::FailedToGetLiquidity(e.to_string()))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, OnchainError> {
        IERC20::new(token, self.provider.clone())
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| OnchainError::FailedToGetBalance {
                token,
                reason: e.to_string(),
            })
    }

    async fn gas_price(&self) -> Result<u128, OnchainError> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| OnchainError::FailedToGetGasPrice(e.to_string()))
    }

    async fn send(
        &self,
        call: &ContractCall,
        gas: GasSettings,
    ) -> Result<Self::Pending, OnchainError> {
        let input = call
            .input()
            .map_err(|e| OnchainError::FailedToSendTransaction {
                reason: e.to_string(),
                revert_data: None,
            })?;

        let request = TransactionRequest::default()
            .with_from(self.signer)
            .with_gas_price(gas.gas_price)
            .with_gas_limit(gas.gas_limit);
        let request = match call.target() {
            Some(to) => request.with_to(to).with_input(input),
            None => request.with_deploy_code(input),
        };

        debug!(operation = ?call.operation(), to = ?call.target(), "sending transaction");

        self.provider
            .send_transaction(request)
            .await
            .map_err(|e| OnchainError::FailedToSendTransaction {
                revert_data: revert_data(&e),
                reason: e.to_string(),
            })
    }

    fn pending_hash(pending: &Self::Pending) -> B256 {
        *pending.tx_hash()
    }

    async fn confirm(&self, pending: Self::Pending) -> Result<TxReceipt, OnchainError> {
        let tx_hash = *pending.tx_hash();
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| OnchainError::FailedToGetReceipt {
                tx_hash,
                reason: e.to_string(),
            })?;

        Ok(TxReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            success: receipt.status(),
            contract_address: receipt.contract_address,
            logs: receipt
                .inner
                .logs()
                .iter()
                .map(|log| log.inner.clone())
                .collect(),
        })
    }
}
