//! Reward gauge client

use crate::config::{CompoundingConfig, FeeLimits};
use crate::contracts::ContractCaller;
use crate::math::{from_base_units, to_base_units};
use crate::tron::codec::claimable_reward_forCall;
use crate::tron::{decode_output, ContractCall, TronAddress, TxId};
use crate::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

/// Staking contract that pays rewards on deposited LP tokens
#[async_trait]
pub trait RewardGauge: Send + Sync {
    /// Rewards currently claimable by the account, in display units.
    ///
    /// A failed or empty read is an error, never zero.
    async fn claimable_rewards(&self) -> Result<Decimal>;

    /// Claim accrued rewards to the account
    async fn claim_rewards(&self) -> Result<TxId>;

    /// Stake `amount` LP tokens (display units)
    async fn deposit(&self, amount: Decimal) -> Result<TxId>;
}

/// [`RewardGauge`] backed by the on-chain gauge contract
pub struct GaugeClient {
    caller: ContractCaller,
    gauge: TronAddress,
    reward_decimals: u32,
    lp_decimals: u32,
    fee_limits: FeeLimits,
}

impl GaugeClient {
    pub fn new(caller: ContractCaller, config: &CompoundingConfig) -> Self {
        Self {
            caller,
            gauge: config.pool.gauge,
            reward_decimals: config.pool.base_token.decimals,
            lp_decimals: config.pool.lp_token.decimals,
            fee_limits: config.fee_limits,
        }
    }
}

#[async_trait]
impl RewardGauge for GaugeClient {
    async fn claimable_rewards(&self) -> Result<Decimal> {
        let owner = self.caller.owner();
        let call = ContractCall::ClaimableRewardFor {
            account: owner.to_binary20(),
        };

        let output = self.caller.read(self.gauge, Some(owner), &call).await?;
        let raw = decode_output::<claimable_reward_forCall>(&output)?;
        debug!(raw = %raw, "Claimable rewards");

        from_base_units(raw, self.reward_decimals)
    }

    async fn claim_rewards(&self) -> Result<TxId> {
        self.caller
            .execute(self.gauge, &ContractCall::ClaimRewards, self.fee_limits.claim_sun)
            .await
    }

    async fn deposit(&self, amount: Decimal) -> Result<TxId> {
        let value = to_base_units(amount, self.lp_decimals)?;
        self.caller
            .execute(
                self.gauge,
                &ContractCall::Deposit { value },
                self.fee_limits.deposit_sun,
            )
            .await
    }
}
