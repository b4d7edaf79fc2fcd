use crate::chain::TxReceipt;
use crate::chain::contracts::INonfungiblePositionManager::IncreaseLiquidity;
use alloy::sol_types::SolEvent;
use alloy_primitives::{Address, B256, U256};
use tracing::{debug, warn};

/// Decoded `IncreaseLiquidity` emitted by a position manager mint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MintedPosition {
    pub token_id: U256,
    pub liquidity: u128,
    pub amount0: U256,
    pub amount1: U256,
}

/// The receipt carried no `IncreaseLiquidity` log from the expected emitter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MintEventNotFound {
    pub tx_hash: B256,
}

/// Returns the first `IncreaseLiquidity` log emitted by `emitter`.
pub fn extract_increase_liquidity(
    receipt: &TxReceipt,
    emitter: Address,
) -> Result<MintedPosition, MintEventNotFound> {
    let found = receipt
        .logs
        .iter()
        .filter(|log| log.address == emitter)
        .filter(|log| log.topics().first() == Some(&IncreaseLiquidity::SIGNATURE_HASH))
        .find_map(|log| match IncreaseLiquidity::decode_log(log) {
            Ok(decoded) => Some(decoded.data),
            Err(err) => {
                debug!(%err, "skipping undecodable IncreaseLiquidity log");
                None
            }
        });

    match found {
        Some(event) => Ok(MintedPosition {
            token_id: event.tokenId,
            liquidity: event.liquidity,
            amount0: event.amount0,
            amount1: event.amount1,
        }),
        None => {
            warn!(tx_hash = %receipt.tx_hash, "mint receipt has no IncreaseLiquidity event");
            Err(MintEventNotFound {
                tx_hash: receipt.tx_hash,
            })
        }
    }
}
