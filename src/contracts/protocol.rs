//! Contract call protocol
//!
//! Two modes, both starting from a constant call on the node:
//!
//! - **simulate**: run the call without broadcasting; used for reads and as
//!   the first phase of every write.
//! - **execute**: simulate, take the unsigned transaction the node built,
//!   set a fee ceiling, refuse it if the node already marks it failed, sign,
//!   broadcast, and return the transaction id.
//!
//! An `Err` from [`ContractCaller::execute`] means no transaction was sent
//! as far as this process knows. Callers must not assume anything about
//! partial progress on-chain.

use crate::tron::{
    ChainClient, ContractCall, SimulationOutcome, TriggerRequest, TronAddress, TxId,
};
use crate::wallet::SecureWallet;
use crate::{Error, Result};
use alloy::sol_types::decode_revert_reason;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs contract calls for one account
#[derive(Clone)]
pub struct ContractCaller {
    client: Arc<dyn ChainClient>,
    wallet: Arc<SecureWallet>,
}

impl ContractCaller {
    pub fn new(client: Arc<dyn ChainClient>, wallet: Arc<SecureWallet>) -> Self {
        Self { client, wallet }
    }

    /// The account calls are made from
    pub fn owner(&self) -> TronAddress {
        self.wallet.address()
    }

    /// Run `call` on `contract` without broadcasting.
    ///
    /// Fails with [`Error::SimulationFailed`] when the node reports failure.
    pub async fn simulate(
        &self,
        contract: TronAddress,
        owner: Option<TronAddress>,
        call: &ContractCall,
    ) -> Result<SimulationOutcome> {
        let request = TriggerRequest {
            contract,
            owner,
            data: call.encode(),
        };

        debug!(contract = %contract, method = call.signature(), "Simulating call");
        let outcome = self.client.trigger_constant_contract(&request).await?;

        if !outcome.success {
            let message = outcome
                .message
                .unwrap_or_else(|| "node reported failure".to_string());
            return Err(Error::SimulationFailed(format!(
                "{}: {}",
                call.signature(),
                message
            )));
        }
        Ok(outcome)
    }

    /// Simulate a read and return its first result.
    ///
    /// A reverted call or an empty result set is an error, never a default.
    pub async fn read(
        &self,
        contract: TronAddress,
        owner: Option<TronAddress>,
        call: &ContractCall,
    ) -> Result<Vec<u8>> {
        let outcome = self.simulate(contract, owner, call).await?;
        let reverted = outcome
            .transaction
            .as_ref()
            .is_some_and(|tx| tx.is_failed());
        let mut results = outcome.constant_result.into_iter();

        if reverted {
            let reason = outcome
                .message
                .or_else(|| results.next().and_then(|data| decode_revert_reason(&data)))
                .unwrap_or_else(|| "reverted".to_string());
            return Err(Error::SimulationFailed(format!(
                "{}: {}",
                call.signature(),
                reason
            )));
        }

        results.next().ok_or_else(|| {
            Error::SimulationFailed(format!("{}: no result returned", call.signature()))
        })
    }

    /// Send a state-changing call with the given fee ceiling (sun)
    pub async fn execute(
        &self,
        contract: TronAddress,
        call: &ContractCall,
        fee_limit_sun: u64,
    ) -> Result<TxId> {
        match self.try_execute(contract, call, fee_limit_sun).await {
            Ok(txid) => {
                info!(
                    contract = %contract,
                    method = call.signature(),
                    txid = %txid,
                    "Transaction broadcast"
                );
                Ok(txid)
            }
            Err(e) => {
                warn!(
                    contract = %contract,
                    method = call.signature(),
                    error = %e,
                    "Transaction not sent"
                );
                Err(e)
            }
        }
    }

    async fn try_execute(
        &self,
        contract: TronAddress,
        call: &ContractCall,
        fee_limit_sun: u64,
    ) -> Result<TxId> {
        let outcome = self.simulate(contract, Some(self.owner()), call).await?;

        let mut transaction = outcome.transaction.ok_or_else(|| {
            Error::SimulationFailed(format!("{}: no transaction returned", call.signature()))
        })?;
        transaction.set_fee_limit(fee_limit_sun)?;

        if transaction.is_failed() {
            return Err(Error::TransactionRejected(format!(
                "{}: simulated transaction already failed",
                call.signature()
            )));
        }

        let signed = self.wallet.sign_transaction(transaction)?;
        self.client.broadcast_transaction(&signed).await?;
        Ok(signed.txid())
    }
}
