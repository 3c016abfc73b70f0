//! Configuration for the compounding agent
//!
//! Credentials never live here: the seed phrase or private key is read from
//! the environment by the wallet, and the TronGrid API key by
//! [`TronGridConfig`].

pub mod trongrid;

use crate::tokens::{addresses, TokenInfo};
use crate::tron::TronAddress;
use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub use trongrid::TronGridConfig;

/// Basis points in one whole
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Contracts and tokens making up the compounded position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Gauge staking the LP token and paying rewards in the base token
    pub gauge: TronAddress,
    /// Router used for swaps and liquidity
    pub router: TronAddress,
    /// Pair contract, read for reserves
    pub pair: TronAddress,
    /// Reward asset, swapped in half for the quote asset
    pub base_token: TokenInfo,
    /// Paired asset
    pub quote_token: TokenInfo,
    /// Liquidity token minted by the pair and staked in the gauge
    pub lp_token: TokenInfo,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            gauge: addresses::USDD_USDT_GAUGE,
            router: addresses::SUNSWAP_V2_ROUTER,
            pair: addresses::USDD_USDT_PAIR,
            base_token: TokenInfo::usdd(),
            quote_token: TokenInfo::usdt(),
            lp_token: TokenInfo::usdd_usdt_lp(),
        }
    }
}

/// Fee ceilings per state-changing method, in sun
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeLimits {
    pub claim_sun: u64,
    pub deposit_sun: u64,
    pub swap_sun: u64,
    pub add_liquidity_sun: u64,
}

impl Default for FeeLimits {
    fn default() -> Self {
        Self {
            claim_sun: 400_000_000,         // 400 TRX
            deposit_sun: 400_000_000,       // 400 TRX
            swap_sun: 100_000_000,          // 100 TRX
            add_liquidity_sun: 150_000_000, // 150 TRX
        }
    }
}

/// Waits between steps and between cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Pause after a state-changing call before reading balances again
    pub settlement_delay_secs: u64,
    /// Pause between the end of one cycle and the start of the next
    pub cycle_interval_secs: u64,
}

impl TimingConfig {
    pub fn settlement_delay(&self) -> Duration {
        Duration::from_secs(self.settlement_delay_secs)
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settlement_delay_secs: 30,
            cycle_interval_secs: 3_600, // 60 minutes
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundingConfig {
    /// Minimum claimable reward, and minimum base balance, worth acting on
    /// (display units of the base token)
    pub claim_threshold: Decimal,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub fee_limits: FeeLimits,
    /// Slippage tolerance for swaps and liquidity (50 = 0.5%)
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u32,
    /// Validity window of swap and liquidity calls
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    #[serde(default)]
    pub timing: TimingConfig,
    /// Only count confirmed blocks when reading balances
    #[serde(default = "default_only_confirmed")]
    pub only_confirmed: bool,
}

fn default_slippage_bps() -> u32 {
    50
}

fn default_deadline_secs() -> u64 {
    300
}

fn default_only_confirmed() -> bool {
    true
}

impl Default for CompoundingConfig {
    fn default() -> Self {
        Self {
            claim_threshold: Decimal::ONE,
            pool: PoolConfig::default(),
            fee_limits: FeeLimits::default(),
            slippage_bps: default_slippage_bps(),
            deadline_secs: default_deadline_secs(),
            timing: TimingConfig::default(),
            only_confirmed: default_only_confirmed(),
        }
    }
}

impl CompoundingConfig {
    /// Load a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the agent cannot act on
    pub fn validate(&self) -> Result<()> {
        if self.claim_threshold.is_sign_negative() {
            return Err(Error::Config(format!(
                "claim_threshold must not be negative, got {}",
                self.claim_threshold
            )));
        }
        if self.slippage_bps >= BPS_DENOMINATOR {
            return Err(Error::Config(format!(
                "slippage_bps must be below {}, got {}",
                BPS_DENOMINATOR, self.slippage_bps
            )));
        }
        if self.deadline_secs == 0 {
            return Err(Error::Config("deadline_secs must be positive".to_string()));
        }
        if self.pool.base_token.address == self.pool.quote_token.address {
            return Err(Error::Config(
                "base and quote tokens must differ".to_string(),
            ));
        }
        Ok(())
    }

    /// Fraction of the expected amount accepted as a minimum (0.995 for 50 bps)
    pub fn slippage_factor(&self) -> f64 {
        f64::from(BPS_DENOMINATOR - self.slippage_bps) / f64::from(BPS_DENOMINATOR)
    }
}
