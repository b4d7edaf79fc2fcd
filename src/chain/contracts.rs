use crate::error::MathError;
use crate::params::{MintParameters, SwapParameters};
use alloy::sol;
use alloy_primitives::U256;
use alloy_primitives::aliases::{I24, U24};

sol! {
    #[sol(rpc)]
    interface IUniswapV3Pool {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function fee() external view returns (uint24);
        function tickSpacing() external view returns (int24);
        function slot0() external view returns (
            uint160 sqrtPriceX96,
            int24 tick,
            uint16 observationIndex,
            uint16 observationCardinality,
            uint16 observationCardinalityNext,
            uint8 feeProtocol,
            bool unlocked
        );
        function liquidity() external view returns (uint128);
    }
}

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

sol! {
    #[sol(rpc)]
    interface INonfungiblePositionManager {
        struct MintParams {
            address token0;
            address token1;
            uint24 fee;
            int24 tickLower;
            int24 tickUpper;
            uint256 amount0Desired;
            uint256 amount1Desired;
            uint256 amount0Min;
            uint256 amount1Min;
            address recipient;
            uint256 deadline;
        }

        event IncreaseLiquidity(
            uint256 indexed tokenId,
            uint128 liquidity,
            uint256 amount0,
            uint256 amount1
        );

        function mint(MintParams calldata params)
            external
            payable
            returns (uint256 tokenId, uint128 liquidity, uint256 amount0, uint256 amount1);
    }
}

sol! {
    #[sol(rpc)]
    interface ISwapRouter {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 deadline;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }

        function exactInputSingle(ExactInputSingleParams calldata params)
            external
            payable
            returns (uint256 amountOut);
    }
}

impl TryFrom<&MintParameters> for INonfungiblePositionManager::MintParams {
    type Error = MathError;

    fn try_from(params: &MintParameters) -> Result<Self, Self::Error> {
        let tick = |value: i32| I24::try_from(value).map_err(|_| MathError::TickOutOfBounds(value));

        Ok(Self {
            token0: params.token0,
            token1: params.token1,
            fee: U24::from(params.fee),
            tickLower: tick(params.tick_lower)?,
            tickUpper: tick(params.tick_upper)?,
            amount0Desired: params.amount0_desired,
            amount1Desired: params.amount1_desired,
            amount0Min: params.amount0_min,
            amount1Min: params.amount1_min,
            recipient: params.recipient,
            deadline: U256::from(params.deadline),
        })
    }
}

impl From<&SwapParameters> for ISwapRouter::ExactInputSingleParams {
    fn from(params: &SwapParameters) -> Self {
        Self {
            tokenIn: params.token_in,
            tokenOut: params.token_out,
            fee: U24::from(params.fee),
            recipient: params.recipient,
            deadline: U256::from(params.deadline),
            amountIn: params.amount_in,
            amountOutMinimum: params.amount_out_minimum,
            sqrtPriceLimitX96: params.sqrt_price_limit_x96,
        }
    }
}
