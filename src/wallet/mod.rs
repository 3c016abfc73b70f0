//! Wallet: key derivation and transaction signing

mod signer;

pub use signer::{SecureWallet, MNEMONIC_ENV, PRIVATE_KEY_ENV};
