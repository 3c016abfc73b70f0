//! Secure wallet implementation
//!
//! SECURITY: This is the ONLY place where private keys exist.
//! - Keys are held in alloy's PrivateKeySigner which handles crypto securely
//! - Keys are never serialized
//! - Keys are never logged

use crate::tron::{PendingTransaction, SignedTransaction, TronAddress};
use crate::{Error, Result};
use alloy::signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use alloy::signers::SignerSync;
use secrecy::{ExposeSecret, SecretString};

/// Environment variable holding the BIP-39 seed phrase
pub const MNEMONIC_ENV: &str = "TRON_MNEMONIC";
/// Environment variable holding a hex private key (alternative to the phrase)
pub const PRIVATE_KEY_ENV: &str = "TRON_PRIVATE_KEY";

/// Secure wallet that protects private keys
///
/// The private key is:
/// - Stored in alloy's PrivateKeySigner (handles crypto securely)
/// - Never serialized (no Serialize impl)
/// - Only accessible via signing operations
pub struct SecureWallet {
    /// The signer
    signer: PrivateKeySigner,
    /// Public address (safe to expose)
    address: TronAddress,
}

impl SecureWallet {
    /// Load the wallet from the environment
    ///
    /// `TRON_MNEMONIC` wins over `TRON_PRIVATE_KEY` when both are set.
    pub fn from_env() -> Result<Self> {
        if let Ok(phrase) = std::env::var(MNEMONIC_ENV) {
            return Self::from_mnemonic(&SecretString::from(phrase), 0);
        }
        if let Ok(key) = std::env::var(PRIVATE_KEY_ENV) {
            return Self::from_hex(&SecretString::from(key));
        }
        Err(Error::Wallet(format!(
            "Neither {} nor {} is set. One is required to sign transactions.",
            MNEMONIC_ENV, PRIVATE_KEY_ENV
        )))
    }

    /// Derive account `index` from a seed phrase on the m/44'/60'/0'/0 path
    pub fn from_mnemonic(phrase: &SecretString, index: u32) -> Result<Self> {
        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase.expose_secret())
            .index(index)
            .map_err(|e| Error::Wallet(format!("Invalid derivation index: {}", e)))?
            .build()
            .map_err(|e| Error::Wallet(format!("Invalid mnemonic: {}", e)))?;

        Ok(Self::from_signer(signer))
    }

    /// Create a wallet from a hex-encoded private key
    pub fn from_hex(key_hex: &SecretString) -> Result<Self> {
        let key_hex = key_hex.expose_secret();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::Wallet(format!("Invalid private key: {}", e)))?;

        Ok(Self::from_signer(signer))
    }

    fn from_signer(signer: PrivateKeySigner) -> Self {
        // Tron addresses share the EVM derivation, only the prefix differs
        let address = TronAddress::from_binary20(signer.address());
        Self { signer, address }
    }

    /// Get the public address (safe to share)
    pub fn address(&self) -> TronAddress {
        self.address
    }

    /// Sign a transaction body
    ///
    /// This is the ONLY way to use the private key. The signature covers the
    /// transaction id and is laid out as r || s || v with v in {27, 28}.
    pub fn sign_transaction(&self, transaction: PendingTransaction) -> Result<SignedTransaction> {
        let txid = transaction.txid();
        let signature = self
            .signer
            .sign_hash_sync(&txid.0)
            .map_err(|e| Error::Wallet(format!("Signing failed: {}", e)))?;

        Ok(transaction.into_signed(signature.as_bytes()))
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for SecureWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureWallet")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}
