//! Swap router client
//!
//! Swaps go base -> quote along a fixed two-token path. Both swaps and
//! liquidity calls carry a minimum-output floor derived from the configured
//! slippage, and a deadline a few minutes after the call is built.

use crate::config::{CompoundingConfig, FeeLimits};
use crate::contracts::ContractCaller;
use crate::math::{from_base_units, pow10, rescale, scale_float_to_bigint, to_base_units, to_ratio};
use crate::tokens::TokenInfo;
use crate::tron::codec::getReservesCall;
use crate::tron::{decode_output, ContractCall, TronAddress, TxId};
use crate::{Error, Result};
use alloy::primitives::U256;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Reserves of the pair, base asset first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReserves {
    pub base: U256,
    pub quote: U256,
    pub base_decimals: u32,
    pub quote_decimals: u32,
    pub block_timestamp_last: u32,
}

impl PoolReserves {
    /// Quote units per base unit, from display-unit reserves
    pub fn price(&self) -> Result<f64> {
        if self.base.is_zero() || self.quote.is_zero() {
            return Err(Error::EmptyReserves);
        }
        let base = to_ratio(self.base, pow10(self.base_decimals))?;
        let quote = to_ratio(self.quote, pow10(self.quote_decimals))?;
        Ok(quote / base)
    }

    pub fn base_display(&self) -> Result<Decimal> {
        from_base_units(self.base, self.base_decimals)
    }

    pub fn quote_display(&self) -> Result<Decimal> {
        from_base_units(self.quote, self.quote_decimals)
    }
}

/// Pool operations the compounder needs
#[async_trait]
pub trait LiquidityRouter: Send + Sync {
    async fn reserves(&self) -> Result<PoolReserves>;

    /// Swap `amount_in` of the base asset for the quote asset
    async fn swap_base_for_quote(&self, amount_in: Decimal) -> Result<TxId>;

    /// Provide `base_amount` and `quote_amount` (display units) as liquidity
    async fn add_liquidity(&self, base_amount: Decimal, quote_amount: Decimal) -> Result<TxId>;
}

/// [`LiquidityRouter`] backed by a SunSwap V2 style router and pair
pub struct RouterClient {
    caller: ContractCaller,
    router: TronAddress,
    pair: TronAddress,
    base: TokenInfo,
    quote: TokenInfo,
    slippage_factor: f64,
    deadline_secs: u64,
    fee_limits: FeeLimits,
}

impl RouterClient {
    pub fn new(caller: ContractCaller, config: &CompoundingConfig) -> Self {
        Self {
            caller,
            router: config.pool.router,
            pair: config.pool.pair,
            base: config.pool.base_token.clone(),
            quote: config.pool.quote_token.clone(),
            slippage_factor: config.slippage_factor(),
            deadline_secs: config.deadline_secs,
            fee_limits: config.fee_limits,
        }
    }

    fn deadline(&self) -> U256 {
        deadline_after(Utc::now().timestamp(), self.deadline_secs)
    }

    /// Minimum acceptable quote output for `amount_in` base units, assuming
    /// the pair trades near parity
    fn swap_min_out(&self, amount_in: U256) -> Result<U256> {
        let as_quote = rescale(amount_in, self.base.decimals, self.quote.decimals);
        scale_float_to_bigint(as_quote, self.slippage_factor)
    }
}

fn deadline_after(now_secs: i64, window_secs: u64) -> U256 {
    U256::from(now_secs.max(0) as u64 + window_secs)
}

#[async_trait]
impl LiquidityRouter for RouterClient {
    async fn reserves(&self) -> Result<PoolReserves> {
        let output = self
            .caller
            .read(self.pair, None, &ContractCall::GetReserves)
            .await?;
        let decoded = decode_output::<getReservesCall>(&output)?;

        let reserves = PoolReserves {
            base: U256::from(decoded._reserve0),
            quote: U256::from(decoded._reserve1),
            base_decimals: self.base.decimals,
            quote_decimals: self.quote.decimals,
            block_timestamp_last: decoded._blockTimestampLast,
        };
        debug!(
            base = %reserves.base,
            quote = %reserves.quote,
            updated = reserves.block_timestamp_last,
            "Pool reserves"
        );
        Ok(reserves)
    }

    async fn swap_base_for_quote(&self, amount_in: Decimal) -> Result<TxId> {
        let amount_in_raw = to_base_units(amount_in, self.base.decimals)?;
        let amount_out_min = self.swap_min_out(amount_in_raw)?;

        info!(
            amount_in = %amount_in,
            from = %self.base.symbol,
            to = %self.quote.symbol,
            amount_out_min = %amount_out_min,
            "Swapping"
        );

        let call = ContractCall::SwapExactTokensForTokens {
            amount_in: amount_in_raw,
            amount_out_min,
            path: vec![self.base.address.to_binary20(), self.quote.address.to_binary20()],
            to: self.caller.owner().to_binary20(),
            deadline: self.deadline(),
        };
        self.caller
            .execute(self.router, &call, self.fee_limits.swap_sun)
            .await
    }

    async fn add_liquidity(&self, base_amount: Decimal, quote_amount: Decimal) -> Result<TxId> {
        let base_desired = to_base_units(base_amount, self.base.decimals)?;
        let quote_desired = to_base_units(quote_amount, self.quote.decimals)?;

        info!(
            base = %base_amount,
            quote = %quote_amount,
            "Adding liquidity"
        );

        let call = ContractCall::AddLiquidity {
            token_a: self.base.address.to_binary20(),
            token_b: self.quote.address.to_binary20(),
            amount_a_desired: base_desired,
            amount_b_desired: quote_desired,
            amount_a_min: scale_float_to_bigint(base_desired, self.slippage_factor)?,
            amount_b_min: scale_float_to_bigint(quote_desired, self.slippage_factor)?,
            to: self.caller.owner().to_binary20(),
            deadline: self.deadline(),
        };
        self.caller
            .execute(self.router, &call, self.fee_limits.add_liquidity_sun)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::testing::{test_wallet, MockChain};
    use crate::tokens::addresses;
    use std::str::FromStr;
    use std::sync::Arc;

    fn router(chain: &Arc<MockChain>) -> RouterClient {
        RouterClient::new(
            ContractCaller::new(chain.clone(), test_wallet()),
            &CompoundingConfig::default(),
        )
    }

    fn word(value: u128) -> Vec<u8> {
        U256::from(value).to_be_bytes::<32>().to_vec()
    }

    fn reserves(base: u128, quote: u128) -> PoolReserves {
        PoolReserves {
            base: U256::from(base),
            quote: U256::from(quote),
            base_decimals: 18,
            quote_decimals: 6,
            block_timestamp_last: 0,
        }
    }

    #[test]
    fn test_price_from_mixed_decimals() {
        // 1,000,000 USDD against 999,800 USDT
        let pool = reserves(1_000_000 * 10u128.pow(18), 999_800 * 10u128.pow(6));
        let price = pool.price().unwrap();
        assert!((price - 0.9998).abs() < 1e-12);
        assert_eq!(pool.quote_display().unwrap(), Decimal::from(999_800));
    }

    #[test]
    fn test_price_rejects_empty_pool() {
        assert!(matches!(reserves(0, 5).price(), Err(Error::EmptyReserves)));
        assert!(matches!(reserves(5, 0).price(), Err(Error::EmptyReserves)));
    }

    #[test]
    fn test_deadline_window() {
        assert_eq!(deadline_after(1_700_000_000, 300), U256::from(1_700_000_300u64));
    }

    #[tokio::test]
    async fn test_reserves_read_from_pair_without_owner() {
        let mut data = word(1_000_000 * 10u128.pow(18));
        data.extend(word(999_800 * 10u128.pow(6)));
        data.extend(word(1_700_000_000));
        let chain = MockChain::returning(vec![data]);

        let pool = router(&chain).reserves().await.unwrap();
        assert_eq!(pool.block_timestamp_last, 1_700_000_000);
        assert_eq!(pool.base, U256::from(1_000_000 * 10u128.pow(18)));

        let request = chain.last_request();
        assert_eq!(request.contract, addresses::USDD_USDT_PAIR);
        assert_eq!(request.owner, None);
    }

    #[tokio::test]
    async fn test_swap_min_out_for_one_thousand() {
        let chain = MockChain::returning(vec![vec![]]);
        let router = router(&chain);
        router.swap_base_for_quote(Decimal::from(1000)).await.unwrap();

        let request = chain.last_request();
        assert_eq!(request.contract, addresses::SUNSWAP_V2_ROUTER);
        match ContractCall::decode(&request.data).unwrap() {
            ContractCall::SwapExactTokensForTokens {
                amount_in,
                amount_out_min,
                path,
                to,
                deadline,
            } => {
                assert_eq!(amount_in, U256::from(1000u128 * 10u128.pow(18)));
                // 995 USDT at 6 decimals
                assert_eq!(amount_out_min, U256::from(995_000_000u64));
                assert_eq!(
                    path,
                    vec![addresses::USDD.to_binary20(), addresses::USDT.to_binary20()]
                );
                assert_eq!(to, router.caller.owner().to_binary20());
                assert!(deadline > U256::from(Utc::now().timestamp() as u64));
            }
            other => panic!("unexpected call {:?}", other),
        }
        assert_eq!(chain.broadcast_count(), 1);
    }

    #[tokio::test]
    async fn test_add_liquidity_uses_each_desired_amount() {
        let chain = MockChain::returning(vec![vec![]]);
        router(&chain)
            .add_liquidity(
                Decimal::from(500),
                Decimal::from_str("499.9").unwrap(),
            )
            .await
            .unwrap();

        match ContractCall::decode(&chain.last_request().data).unwrap() {
            ContractCall::AddLiquidity {
                token_a,
                token_b,
                amount_a_desired,
                amount_b_desired,
                amount_a_min,
                amount_b_min,
                ..
            } => {
                assert_eq!(token_a, addresses::USDD.to_binary20());
                assert_eq!(token_b, addresses::USDT.to_binary20());
                assert_eq!(amount_a_desired, U256::from(500u128 * 10u128.pow(18)));
                assert_eq!(amount_b_desired, U256::from(499_900_000u64));
                assert_eq!(amount_a_min, U256::from(4975u128 * 10u128.pow(17)));
                assert_eq!(amount_b_min, U256::from(497_400_500u64));
            }
            other => panic!("unexpected call {:?}", other),
        }
    }
}
