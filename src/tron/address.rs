//! Tron account and contract addresses
//!
//! A Tron address is a 21-byte value: the `0x41` network prefix followed by
//! the same 20 bytes an EVM address would carry. Humans see it as a
//! base58check string (`T...`); contract calls carry the bare 20 bytes.

use crate::{Error, Result};
use alloy::hex;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Network prefix byte for mainnet (and the public testnets)
pub const ADDRESS_PREFIX: u8 = 0x41;

const PREFIXED_LEN: usize = 21;

/// A validated Tron address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TronAddress(Address);

impl TronAddress {
    /// Wrap the 20-byte body of an address
    pub const fn from_binary20(bytes: Address) -> Self {
        Self(bytes)
    }

    /// The 20-byte form used inside call payloads
    pub fn to_binary20(&self) -> Address {
        self.0
    }

    /// The 21-byte prefixed form
    pub fn to_prefixed_bytes(&self) -> [u8; PREFIXED_LEN] {
        let mut out = [0u8; PREFIXED_LEN];
        out[0] = ADDRESS_PREFIX;
        out[1..].copy_from_slice(self.0.as_slice());
        out
    }

    /// Hex form (`41...`) used by the node's HTTP API
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_prefixed_bytes())
    }

    /// Parse the node's `41...` hex form
    pub fn from_hex(input: &str) -> Result<Self> {
        let bytes = hex::decode(input.strip_prefix("0x").unwrap_or(input))
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", input, e)))?;
        Self::from_prefixed(&bytes, input)
    }

    fn from_prefixed(bytes: &[u8], input: &str) -> Result<Self> {
        if bytes.len() != PREFIXED_LEN {
            return Err(Error::InvalidAddress(format!(
                "{} decodes to {} bytes, expected {}",
                input,
                bytes.len(),
                PREFIXED_LEN
            )));
        }
        if bytes[0] != ADDRESS_PREFIX {
            return Err(Error::InvalidAddress(format!(
                "{} has network prefix {:#04x}",
                input, bytes[0]
            )));
        }
        Ok(Self(Address::from_slice(&bytes[1..])))
    }
}

/// Decode a checksummed address straight to its 20 payload bytes
pub fn address_to_binary20(checksummed: &str) -> Result<[u8; 20]> {
    let address: TronAddress = checksummed.parse()?;
    Ok(address.to_binary20().into())
}

impl FromStr for TronAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s)
            .with_check(None)
            .into_vec()
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", s, e)))?;
        Self::from_prefixed(&bytes, s)
    }
}

impl fmt::Display for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = bs58::encode(self.to_prefixed_bytes())
            .with_check()
            .into_string();
        f.write_str(&encoded)
    }
}

impl TryFrom<String> for TronAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TronAddress> for String {
    fn from(value: TronAddress) -> Self {
        value.to_string()
    }
}
