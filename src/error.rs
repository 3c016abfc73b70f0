//! Error types for the compounding agent

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Contract simulation failed: {0}")]
    SimulationFailed(String),

    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Account lookup failed: {0}")]
    AccountLookupFailed(String),

    #[error("Pool has an empty reserve")]
    EmptyReserves,

    #[error("Malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("ABI error: {0}")]
    Abi(#[from] alloy::sol_types::Error),

    #[error("Math error: {0}")]
    Math(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
