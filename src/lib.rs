//! Tron Auto-Compounder
//!
//! An unattended agent that compounds a staked liquidity position on Tron:
//! - Claims gauge rewards once they pass a threshold
//! - Swaps half of the reward asset into the paired asset
//! - Adds both sides as liquidity in the pool's proportion
//! - Stakes the resulting LP tokens back into the gauge
//!
//! # Security Model
//!
//! - Private keys never leave the wallet module
//! - Every state-changing call is simulated before it is signed
//! - Every transaction carries an explicit fee ceiling

pub mod balance;
pub mod compounder;
pub mod config;
pub mod contracts;
pub mod math;
pub mod tokens;
pub mod tron;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use balance::{AccountBalance, BalanceSource, TronGridIndexer};
pub use compounder::{AutoCompounder, CycleOutcome};
pub use config::{CompoundingConfig, TronGridConfig};
pub use error::{Error, Result};
