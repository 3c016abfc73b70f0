//! Shared token registry
//!
//! Token metadata (addresses, decimals, symbols) for the pool the agent
//! compounds into. This module is the single source of truth for the
//! deployment defaults; a config file may override them.

use crate::tron::TronAddress;
use alloy::primitives::address;
use serde::{Deserialize, Serialize};

/// Decimal exponent of the native asset (TRX, counted in sun)
pub const TRX_DECIMALS: u32 = 6;

/// Well-known contract addresses on Tron mainnet
pub mod addresses {
    use super::*;

    // === Tokens ===
    /// USDD (TPYmHEhy5n8TCEfYGqW2rPxsghSfzghPDn)
    pub const USDD: TronAddress =
        TronAddress::from_binary20(address!("94f24e992ca04b49c6f2a2753076ef8938ed4daa"));
    /// USDT (TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t)
    pub const USDT: TronAddress =
        TronAddress::from_binary20(address!("a614f803b6fd780986a42c78ec9c7f77e6ded13c"));

    // === SunSwap V2 ===
    /// USDD/USDT pair, also the LP token (TNLcz8A9hGKbTNJ6b6C1GTyigwxURbWzkM)
    pub const USDD_USDT_PAIR: TronAddress =
        TronAddress::from_binary20(address!("87ae43ed58e88ac5869d47482e73975654127da4"));
    /// Router (TKzxdSv2FZKQrEqkKVgp5DcwEXBEKMg2Ax)
    pub const SUNSWAP_V2_ROUTER: TronAddress =
        TronAddress::from_binary20(address!("6e0617948fe030a7e4970f8389d4ad295f249b7e"));

    // === Rewards ===
    /// Gauge staking the USDD/USDT LP token (TCkNadwxyik1D66qCGmavuneowDRXPgdkL)
    pub const USDD_USDT_GAUGE: TronAddress =
        TronAddress::from_binary20(address!("1e7af74872558273b650c810ce56504d2bf7492f"));
}

/// Token metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Contract address
    pub address: TronAddress,
    /// Token symbol (e.g., "USDD", "USDT")
    pub symbol: String,
    /// Number of decimals
    pub decimals: u32,
}

impl TokenInfo {
    pub fn new(address: TronAddress, symbol: &str, decimals: u32) -> Self {
        Self {
            address,
            symbol: symbol.to_string(),
            decimals,
        }
    }

    /// USDD: reward and base asset of the pool
    pub fn usdd() -> Self {
        Self::new(addresses::USDD, "USDD", 18)
    }

    /// USDT: quote asset of the pool
    pub fn usdt() -> Self {
        Self::new(addresses::USDT, "USDT", 6)
    }

    /// USDD/USDT liquidity token
    pub fn usdd_usdt_lp() -> Self {
        Self::new(addresses::USDD_USDT_PAIR, "USDD-USDT-LP", 18)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses_match_checksummed_form() {
        assert_eq!(
            addresses::USDD.to_string(),
            "TPYmHEhy5n8TCEfYGqW2rPxsghSfzghPDn"
        );
        assert_eq!(
            addresses::USDT.to_string(),
            "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"
        );
        assert_eq!(
            addresses::USDD_USDT_PAIR.to_string(),
            "TNLcz8A9hGKbTNJ6b6C1GTyigwxURbWzkM"
        );
        assert_eq!(
            addresses::SUNSWAP_V2_ROUTER.to_string(),
            "TKzxdSv2FZKQrEqkKVgp5DcwEXBEKMg2Ax"
        );
        assert_eq!(
            addresses::USDD_USDT_GAUGE.to_string(),
            "TCkNadwxyik1D66qCGmavuneowDRXPgdkL"
        );
    }

    #[test]
    fn test_token_info() {
        let usdd = TokenInfo::usdd();
        assert_eq!(usdd.symbol, "USDD");
        assert_eq!(usdd.decimals, 18);

        let usdt = TokenInfo::usdt();
        assert_eq!(usdt.symbol, "USDT");
        assert_eq!(usdt.decimals, 6);

        assert_eq!(TokenInfo::usdd_usdt_lp().address, addresses::USDD_USDT_PAIR);
    }
}
