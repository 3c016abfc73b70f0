//! On-chain contracts the agent talks to
//!
//! - [`protocol`]: simulate / execute over a [`ChainClient`](crate::tron::ChainClient)
//! - [`gauge`]: reward gauge (claimable, claim, deposit)
//! - [`router`]: swap router and pair reserves

pub mod gauge;
pub mod protocol;
pub mod router;

pub use gauge::{GaugeClient, RewardGauge};
pub use protocol::ContractCaller;
pub use router::{LiquidityRouter, PoolReserves, RouterClient};

#[cfg(test)]
pub(crate) mod testing {
    use crate::tron::{
        ChainClient, PendingTransaction, SignedTransaction, SimulationOutcome, TriggerRequest,
    };
    use crate::wallet::SecureWallet;
    use crate::{Error, Result};
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::sync::{Arc, Mutex};

    pub const TEST_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    /// Unsigned body the mock node hands back from every simulation
    pub const RAW_TX: &str = "0a02abcd2208010203040506070840c0843d";

    pub fn test_wallet() -> Arc<SecureWallet> {
        Arc::new(SecureWallet::from_hex(&SecretString::from(TEST_KEY.to_string())).unwrap())
    }

    /// In-memory node recording every request it receives
    pub struct MockChain {
        pub outcome: Mutex<SimulationOutcome>,
        pub broadcast_error: Mutex<Option<String>>,
        pub requests: Mutex<Vec<TriggerRequest>>,
        pub broadcasts: Mutex<Vec<SignedTransaction>>,
    }

    impl MockChain {
        /// Node answering every call successfully with `constant_result`
        pub fn returning(constant_result: Vec<Vec<u8>>) -> Arc<Self> {
            Arc::new(Self {
                outcome: Mutex::new(SimulationOutcome {
                    success: true,
                    message: None,
                    constant_result,
                    transaction: Some(PendingTransaction::from_hex(RAW_TX, false).unwrap()),
                }),
                broadcast_error: Mutex::new(None),
                requests: Mutex::new(Vec::new()),
                broadcasts: Mutex::new(Vec::new()),
            })
        }

        pub fn set_outcome(&self, outcome: SimulationOutcome) {
            *self.outcome.lock().unwrap() = outcome;
        }

        pub fn reject_broadcasts(&self, message: &str) {
            *self.broadcast_error.lock().unwrap() = Some(message.to_string());
        }

        pub fn last_request(&self) -> TriggerRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }

        pub fn broadcast_count(&self) -> usize {
            self.broadcasts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChainClient for MockChain {
        async fn trigger_constant_contract(
            &self,
            request: &TriggerRequest,
        ) -> Result<SimulationOutcome> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self.outcome.lock().unwrap().clone())
        }

        async fn broadcast_transaction(&self, transaction: &SignedTransaction) -> Result<()> {
            if let Some(message) = self.broadcast_error.lock().unwrap().clone() {
                return Err(Error::TransactionRejected(message));
            }
            self.broadcasts.lock().unwrap().push(transaction.clone());
            Ok(())
        }
    }
}
