//! Contract call encoding
//!
//! Every contract method the agent talks to is one variant of
//! [`ContractCall`]. Each variant carries its typed parameters and maps onto
//! an ABI definition generated by `sol!`, so payloads use the exact layout the
//! on-chain contract expects. Tron contracts share the EVM ABI; addresses
//! are passed as their 20-byte body.

use crate::Result;
use alloy::primitives::{Address, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

sol! {
    function claimable_reward_for(address addr) external view returns (uint256);

    function claim_rewards() external;

    function deposit(uint256 _value) external;

    function getReserves() external view returns (uint112 _reserve0, uint112 _reserve1, uint32 _blockTimestampLast);

    function swapExactTokensForTokens(
        uint256 amountIn,
        uint256 amountOutMin,
        address[] path,
        address to,
        uint256 deadline
    ) external returns (uint256[] amounts);

    function addLiquidity(
        address tokenA,
        address tokenB,
        uint256 amountADesired,
        uint256 amountBDesired,
        uint256 amountAMin,
        uint256 amountBMin,
        address to,
        uint256 deadline
    ) external returns (uint256 amountA, uint256 amountB, uint256 liquidity);
}

/// The closed set of contract methods used by the agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    /// Gauge: rewards claimable by `account`
    ClaimableRewardFor { account: Address },
    /// Gauge: claim accrued rewards to the caller
    ClaimRewards,
    /// Gauge: stake `value` LP tokens
    Deposit { value: U256 },
    /// Pair: current reserves
    GetReserves,
    /// Router: exact-input swap along `path`
    SwapExactTokensForTokens {
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
        deadline: U256,
    },
    /// Router: add liquidity for a token pair
    AddLiquidity {
        token_a: Address,
        token_b: Address,
        amount_a_desired: U256,
        amount_b_desired: U256,
        amount_a_min: U256,
        amount_b_min: U256,
        to: Address,
        deadline: U256,
    },
}

impl ContractCall {
    /// Canonical function signature, e.g. `deposit(uint256)`
    pub fn signature(&self) -> &'static str {
        match self {
            Self::ClaimableRewardFor { .. } => claimable_reward_forCall::SIGNATURE,
            Self::ClaimRewards => claim_rewardsCall::SIGNATURE,
            Self::Deposit { .. } => depositCall::SIGNATURE,
            Self::GetReserves => getReservesCall::SIGNATURE,
            Self::SwapExactTokensForTokens { .. } => swapExactTokensForTokensCall::SIGNATURE,
            Self::AddLiquidity { .. } => addLiquidityCall::SIGNATURE,
        }
    }

    /// First four bytes of the signature hash
    pub fn selector(&self) -> [u8; 4] {
        match self {
            Self::ClaimableRewardFor { .. } => claimable_reward_forCall::SELECTOR,
            Self::ClaimRewards => claim_rewardsCall::SELECTOR,
            Self::Deposit { .. } => depositCall::SELECTOR,
            Self::GetReserves => getReservesCall::SELECTOR,
            Self::SwapExactTokensForTokens { .. } => swapExactTokensForTokensCall::SELECTOR,
            Self::AddLiquidity { .. } => addLiquidityCall::SELECTOR,
        }
    }

    /// Encode selector and parameters into a call payload
    pub fn encode(&self) -> Vec<u8> {
        match self.clone() {
            Self::ClaimableRewardFor { account } => {
                claimable_reward_forCall { addr: account }.abi_encode()
            }
            Self::ClaimRewards => claim_rewardsCall {}.abi_encode(),
            Self::Deposit { value } => depositCall { _value: value }.abi_encode(),
            Self::GetReserves => getReservesCall {}.abi_encode(),
            Self::SwapExactTokensForTokens {
                amount_in,
                amount_out_min,
                path,
                to,
                deadline,
            } => swapExactTokensForTokensCall {
                amountIn: amount_in,
                amountOutMin: amount_out_min,
                path,
                to,
                deadline,
            }
            .abi_encode(),
            Self::AddLiquidity {
                token_a,
                token_b,
                amount_a_desired,
                amount_b_desired,
                amount_a_min,
                amount_b_min,
                to,
                deadline,
            } => addLiquidityCall {
                tokenA: token_a,
                tokenB: token_b,
                amountADesired: amount_a_desired,
                amountBDesired: amount_b_desired,
                amountAMin: amount_a_min,
                amountBMin: amount_b_min,
                to,
                deadline,
            }
            .abi_encode(),
        }
    }

    /// Decode a call payload back into its variant, dispatching on the selector
    pub fn decode(data: &[u8]) -> Result<Self> {
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or(alloy::sol_types::Error::Overrun)?;

        let call = if selector == claimable_reward_forCall::SELECTOR {
            let c = claimable_reward_forCall::abi_decode(data)?;
            Self::ClaimableRewardFor { account: c.addr }
        } else if selector == claim_rewardsCall::SELECTOR {
            claim_rewardsCall::abi_decode(data)?;
            Self::ClaimRewards
        } else if selector == depositCall::SELECTOR {
            let c = depositCall::abi_decode(data)?;
            Self::Deposit { value: c._value }
        } else if selector == getReservesCall::SELECTOR {
            getReservesCall::abi_decode(data)?;
            Self::GetReserves
        } else if selector == swapExactTokensForTokensCall::SELECTOR {
            let c = swapExactTokensForTokensCall::abi_decode(data)?;
            Self::SwapExactTokensForTokens {
                amount_in: c.amountIn,
                amount_out_min: c.amountOutMin,
                path: c.path,
                to: c.to,
                deadline: c.deadline,
            }
        } else if selector == addLiquidityCall::SELECTOR {
            let c = addLiquidityCall::abi_decode(data)?;
            Self::AddLiquidity {
                token_a: c.tokenA,
                token_b: c.tokenB,
                amount_a_desired: c.amountADesired,
                amount_b_desired: c.amountBDesired,
                amount_a_min: c.amountAMin,
                amount_b_min: c.amountBMin,
                to: c.to,
                deadline: c.deadline,
            }
        } else {
            return Err(alloy::sol_types::Error::UnknownSelector {
                name: "ContractCall",
                selector: selector.into(),
            }
            .into());
        };

        Ok(call)
    }
}

/// Decode the return data of a constant call into the method's output type
pub fn decode_output<C: SolCall>(data: &[u8]) -> Result<C::Return> {
    Ok(C::abi_decode_returns(data)?)
}
