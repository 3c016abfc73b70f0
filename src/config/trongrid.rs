//! TronGrid endpoint configuration
//!
//! Read from the environment:
//!
//! ```bash
//! # Optional, defaults to the public mainnet gateway
//! export TRONGRID_URL="https://api.trongrid.io"
//!
//! # Optional, raises TronGrid's rate limits
//! export TRONGRID_API_KEY="YOUR_KEY"
//! ```

use crate::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// Header TronGrid reads the API key from
const API_KEY_HEADER: &str = "TRON-PRO-API-KEY";

/// Environment variable names
mod env_vars {
    pub const TRONGRID_URL: &str = "TRONGRID_URL";
    pub const TRONGRID_API_KEY: &str = "TRONGRID_API_KEY";
}

/// Public mainnet gateway
pub const DEFAULT_TRONGRID_URL: &str = "https://api.trongrid.io/";

/// Where to reach the node and indexer APIs
#[derive(Debug)]
pub struct TronGridConfig {
    /// Base URL; always ends with a slash so relative paths join under it
    pub base_url: Url,
    /// API key sent with every request
    pub api_key: Option<SecretString>,
}

impl TronGridConfig {
    pub fn new(base_url: &str, api_key: Option<SecretString>) -> Result<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::Config(format!("Invalid TronGrid URL {}: {}", base_url, e)))?;

        Ok(Self { base_url, api_key })
    }

    /// Create the endpoint config from environment variables
    pub fn from_env() -> Result<Self> {
        let url = match std::env::var(env_vars::TRONGRID_URL) {
            Ok(url) => {
                tracing::debug!("Using TRONGRID_URL");
                url
            }
            Err(_) => DEFAULT_TRONGRID_URL.to_string(),
        };

        let api_key = std::env::var(env_vars::TRONGRID_API_KEY)
            .ok()
            .filter(|key| !key.is_empty())
            .map(SecretString::from);

        if api_key.is_none() {
            tracing::warn!("TRONGRID_API_KEY not set - public rate limits apply");
        }

        Self::new(&url, api_key)
    }

    /// HTTP client carrying the API key header on every request
    pub fn http_client(&self) -> Result<Client> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            let mut value = HeaderValue::from_str(key.expose_secret())
                .map_err(|e| Error::Config(format!("Invalid TronGrid API key: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        Ok(Client::builder().default_headers(headers).build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let config = TronGridConfig::new("https://nile.trongrid.io", None).unwrap();
        assert_eq!(config.base_url.as_str(), "https://nile.trongrid.io/");
        assert_eq!(
            config
                .base_url
                .join("wallet/triggerconstantcontract")
                .unwrap()
                .as_str(),
            "https://nile.trongrid.io/wallet/triggerconstantcontract"
        );
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            TronGridConfig::new("not a url", None),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_http_client_with_key() {
        let config = TronGridConfig::new(
            DEFAULT_TRONGRID_URL,
            Some(SecretString::from("abc-123".to_string())),
        )
        .unwrap();
        assert!(config.http_client().is_ok());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = TronGridConfig::new(
            DEFAULT_TRONGRID_URL,
            Some(SecretString::from("super-secret-key".to_string())),
        )
        .unwrap();
        assert!(!format!("{:?}", config).contains("super-secret-key"));
    }
}
