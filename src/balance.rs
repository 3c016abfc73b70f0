//! Account balance reader
//!
//! Balances come from the TronGrid account indexer
//! (`GET /v1/accounts/{address}`). The native balance is an integer in sun;
//! token balances arrive as a list of single-entry maps keyed by the token
//! contract address, with the amount as a decimal string in base units. A
//! token with no entry has a zero balance.

use crate::config::{CompoundingConfig, TronGridConfig};
use crate::math::from_base_units;
use crate::tokens::{TokenInfo, TRX_DECIMALS};
use crate::tron::TronAddress;
use crate::{Error, Result};
use alloy::primitives::U256;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

/// Balances of the tracked assets at one point in time, in display units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalance {
    pub base: Decimal,
    pub quote: Decimal,
    pub native: Decimal,
    pub lp: Decimal,
}

impl AccountBalance {
    pub fn log(&self) {
        tracing::info!(
            quote = %self.quote,
            base = %self.base,
            native = %self.native,
            lp = %self.lp,
            "Balance snapshot"
        );
    }
}

/// Source of balance snapshots for the agent's account
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn snapshot(&self) -> Result<AccountBalance>;
}

/// Token set a snapshot is taken over
#[derive(Debug, Clone)]
pub struct TrackedTokens {
    pub base: TokenInfo,
    pub quote: TokenInfo,
    pub lp: TokenInfo,
}

impl TrackedTokens {
    pub fn from_config(config: &CompoundingConfig) -> Self {
        Self {
            base: config.pool.base_token.clone(),
            quote: config.pool.quote_token.clone(),
            lp: config.pool.lp_token.clone(),
        }
    }
}

/// [`BalanceSource`] over the TronGrid account indexer
pub struct TronGridIndexer {
    client: Client,
    base_url: Url,
    account: TronAddress,
    tokens: TrackedTokens,
    only_confirmed: bool,
}

impl TronGridIndexer {
    pub fn new(
        endpoint: &TronGridConfig,
        account: TronAddress,
        config: &CompoundingConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: endpoint.http_client()?,
            base_url: endpoint.base_url.clone(),
            account,
            tokens: TrackedTokens::from_config(config),
            only_confirmed: config.only_confirmed,
        })
    }

    fn account_url(&self) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("v1/accounts/{}", self.account))
            .map_err(|e| Error::Config(format!("Invalid indexer URL: {}", e)))?;
        if self.only_confirmed {
            url.query_pairs_mut().append_pair("only_confirmed", "true");
        }
        Ok(url)
    }
}

#[async_trait]
impl BalanceSource for TronGridIndexer {
    async fn snapshot(&self) -> Result<AccountBalance> {
        let url = self.account_url()?;
        let response: AccountsResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let balance = parse_account(response, &self.account, &self.tokens)?;
        balance.log();
        Ok(balance)
    }
}

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    #[serde(default)]
    data: Vec<AccountRecord>,
}

#[derive(Debug, Deserialize)]
struct AccountRecord {
    /// Native balance in sun; absent for accounts that never held TRX
    #[serde(default)]
    balance: u64,
    #[serde(default)]
    trc20: Vec<HashMap<String, String>>,
}

impl AccountRecord {
    fn token_balance(&self, token: &TokenInfo) -> Result<Decimal> {
        let key = token.address.to_string();
        let Some(raw) = self.trc20.iter().find_map(|entry| entry.get(&key)) else {
            return Ok(Decimal::ZERO);
        };

        let raw: U256 = raw.parse().map_err(|e| {
            Error::AccountLookupFailed(format!("{} balance {:?}: {}", token.symbol, raw, e))
        })?;
        from_base_units(raw, token.decimals)
    }
}

fn parse_account(
    response: AccountsResponse,
    account: &TronAddress,
    tokens: &TrackedTokens,
) -> Result<AccountBalance> {
    let record = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| Error::AccountLookupFailed(format!("no record for {}", account)))?;

    Ok(AccountBalance {
        base: record.token_balance(&tokens.base)?,
        quote: record.token_balance(&tokens.quote)?,
        native: from_base_units(U256::from(record.balance), TRX_DECIMALS)?,
        lp: record.token_balance(&tokens.lp)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::addresses;
    use serde_json::json;
    use std::str::FromStr;

    fn tokens() -> TrackedTokens {
        TrackedTokens::from_config(&CompoundingConfig::default())
    }

    fn account() -> TronAddress {
        TronAddress::from_str("TYBNgWfhGuNzdLtjKtxXTfskAhTbMcqbaG").unwrap()
    }

    #[test]
    fn test_parse_all_tokens() {
        let response: AccountsResponse = serde_json::from_value(json!({
            "data": [{
                "address": "41f39fd6e51aad88f6f4ce6ab8827279cfffb92266",
                "balance": 12_345_678,
                "trc20": [
                    { "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t": "150250000" },
                    { "TPYmHEhy5n8TCEfYGqW2rPxsghSfzghPDn": "201500000000000000000" },
                    { "TNLcz8A9hGKbTNJ6b6C1GTyigwxURbWzkM": "1000000000000000" }
                ]
            }],
            "success": true,
            "meta": { "at": 1700000000000u64, "page_size": 1 }
        }))
        .unwrap();

        let balance = parse_account(response, &account(), &tokens()).unwrap();
        assert_eq!(balance.quote, Decimal::from_str("150.25").unwrap());
        assert_eq!(balance.base, Decimal::from_str("201.5").unwrap());
        assert_eq!(balance.native, Decimal::from_str("12.345678").unwrap());
        assert_eq!(balance.lp, Decimal::from_str("0.001").unwrap());
    }

    #[test]
    fn test_missing_tokens_are_zero() {
        let response: AccountsResponse = serde_json::from_value(json!({
            "data": [{
                "balance": 1_000_000,
                "trc20": [{ "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t": "5000000" }]
            }]
        }))
        .unwrap();

        let balance = parse_account(response, &account(), &tokens()).unwrap();
        assert_eq!(balance.quote, Decimal::from(5));
        assert_eq!(balance.base, Decimal::ZERO);
        assert_eq!(balance.lp, Decimal::ZERO);
        assert_eq!(balance.native, Decimal::ONE);
    }

    #[test]
    fn test_no_record_is_lookup_failure() {
        let response: AccountsResponse =
            serde_json::from_value(json!({ "data": [], "success": true })).unwrap();
        assert!(matches!(
            parse_account(response, &account(), &tokens()),
            Err(Error::AccountLookupFailed(_))
        ));
    }

    #[test]
    fn test_malformed_amount() {
        let response: AccountsResponse = serde_json::from_value(json!({
            "data": [{ "trc20": [{ "TPYmHEhy5n8TCEfYGqW2rPxsghSfzghPDn": "12abc" }] }]
        }))
        .unwrap();
        assert!(matches!(
            parse_account(response, &account(), &tokens()),
            Err(Error::AccountLookupFailed(_))
        ));
    }

    #[test]
    fn test_account_url() {
        let endpoint = TronGridConfig::new("https://api.trongrid.io", None).unwrap();
        let indexer =
            TronGridIndexer::new(&endpoint, addresses::USDD, &CompoundingConfig::default())
                .unwrap();
        assert_eq!(
            indexer.account_url().unwrap().as_str(),
            "https://api.trongrid.io/v1/accounts/TPYmHEhy5n8TCEfYGqW2rPxsghSfzghPDn?only_confirmed=true"
        );
    }
}
