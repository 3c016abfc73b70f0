//! Tron chain plumbing: addresses, call encoding, transactions and the node client

pub mod address;
pub mod client;
pub mod codec;
pub mod transaction;

pub use address::{address_to_binary20, TronAddress, ADDRESS_PREFIX};
pub use client::{ChainClient, SimulationOutcome, TriggerRequest, TronGridClient};
pub use codec::{decode_output, ContractCall};
pub use transaction::{PendingTransaction, SignedTransaction, TxId};
