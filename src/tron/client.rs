//! Chain client
//!
//! The agent needs two things from a node: run a contract call without
//! broadcasting it (`triggerconstantcontract`), and broadcast a signed
//! transaction. [`ChainClient`] is that seam; [`TronGridClient`] implements
//! it against the TronGrid HTTP API.

use crate::config::TronGridConfig;
use crate::tron::{PendingTransaction, SignedTransaction, TronAddress};
use crate::{Error, Result};
use alloy::hex;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

/// A contract call to run in constant (non-broadcasting) mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRequest {
    pub contract: TronAddress,
    pub owner: Option<TronAddress>,
    pub data: Vec<u8>,
}

/// What the node reported for a constant call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOutcome {
    pub success: bool,
    /// Node message, decoded to text (present on failure)
    pub message: Option<String>,
    /// Return data of the call, one entry per result
    pub constant_result: Vec<Vec<u8>>,
    /// The unsigned transaction the call would become
    pub transaction: Option<PendingTransaction>,
}

/// Node operations used by the contract call protocol
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Run a call without broadcasting it
    async fn trigger_constant_contract(&self, request: &TriggerRequest)
        -> Result<SimulationOutcome>;

    /// Submit a signed transaction to the network
    async fn broadcast_transaction(&self, transaction: &SignedTransaction) -> Result<()>;
}

/// `ChainClient` over the TronGrid HTTP API
pub struct TronGridClient {
    client: Client,
    base_url: Url,
}

impl TronGridClient {
    pub fn new(config: &TronGridConfig) -> Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            base_url: config.base_url.clone(),
        })
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid TronGrid path {}: {}", path, e)))?;

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ChainClient for TronGridClient {
    async fn trigger_constant_contract(
        &self,
        request: &TriggerRequest,
    ) -> Result<SimulationOutcome> {
        let mut body = json!({
            "contract_address": request.contract.to_hex(),
            "data": hex::encode(&request.data),
            "visible": false,
        });
        if let Some(owner) = &request.owner {
            body["owner_address"] = json!(owner.to_hex());
        }

        tracing::debug!(
            contract = %request.contract,
            data_len = request.data.len(),
            "triggerconstantcontract"
        );

        let response: TriggerResponse = self.post("wallet/triggerconstantcontract", body).await?;
        response.into_outcome()
    }

    async fn broadcast_transaction(&self, transaction: &SignedTransaction) -> Result<()> {
        let body = json!({ "transaction": hex::encode(transaction.encode()) });

        let response: BroadcastResponse = self.post("wallet/broadcasthex", body).await?;
        response.into_result()
    }
}

/// Node messages are hex-encoded UTF-8; fall back to the raw string
fn decode_message(message: &str) -> String {
    hex::decode(message)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| message.to_string())
}

#[derive(Debug, Deserialize)]
struct TriggerResponse {
    #[serde(default)]
    result: ReturnStatus,
    /// Set instead of `result` when the node rejects the request itself
    #[serde(rename = "Error", default)]
    error: Option<String>,
    #[serde(default)]
    constant_result: Vec<String>,
    #[serde(default)]
    transaction: Option<TransactionJson>,
}

#[derive(Debug, Default, Deserialize)]
struct ReturnStatus {
    #[serde(default)]
    result: bool,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionJson {
    #[serde(default)]
    ret: Vec<RetJson>,
    raw_data_hex: String,
}

#[derive(Debug, Deserialize)]
struct RetJson {
    #[serde(default)]
    ret: Option<String>,
}

impl TriggerResponse {
    fn into_outcome(self) -> Result<SimulationOutcome> {
        let message = match (&self.result.message, &self.result.code) {
            (Some(message), _) => Some(decode_message(message)),
            (None, Some(code)) => Some(code.clone()),
            (None, None) => self.error.clone(),
        };

        let constant_result = self
            .constant_result
            .iter()
            .map(|r| {
                hex::decode(r)
                    .map_err(|e| Error::SimulationFailed(format!("constant_result: {}", e)))
            })
            .collect::<Result<Vec<_>>>()?;

        let transaction = self
            .transaction
            .map(|tx| {
                let failed = tx
                    .ret
                    .first()
                    .and_then(|r| r.ret.as_deref())
                    .is_some_and(|code| code == "FAILED");
                PendingTransaction::from_hex(&tx.raw_data_hex, failed)
            })
            .transpose()?;

        Ok(SimulationOutcome {
            success: self.result.result,
            message,
            constant_result,
            transaction,
        })
    }
}

#[derive(Debug, Deserialize)]
struct BroadcastResponse {
    #[serde(default)]
    result: bool,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl BroadcastResponse {
    fn into_result(self) -> Result<()> {
        if self.result {
            return Ok(());
        }
        let detail = self
            .message
            .as_deref()
            .map(decode_message)
            .or(self.code)
            .unwrap_or_else(|| "broadcast refused".to_string());
        Err(Error::TransactionRejected(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_successful_read() {
        let response: TriggerResponse = serde_json::from_value(json!({
            "result": { "result": true },
            "energy_used": 1234,
            "constant_result": [
                "00000000000000000000000000000000000000000000000022b1c8c1227a0000"
            ],
            "transaction": {
                "ret": [{}],
                "visible": false,
                "txID": "14d586fed2bc22fc84b21f25cdfb036f9bb9495636e5b6f65bb4cfde7618a7f4",
                "raw_data_hex": "0a02abcd2208010203040506070840c0843d70e807"
            }
        }))
        .unwrap();

        let outcome = response.into_outcome().unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message, None);
        assert_eq!(outcome.constant_result.len(), 1);
        assert_eq!(outcome.constant_result[0].len(), 32);

        let tx = outcome.transaction.unwrap();
        assert!(!tx.is_failed());
        assert_eq!(
            tx.txid().to_string(),
            "14d586fed2bc22fc84b21f25cdfb036f9bb9495636e5b6f65bb4cfde7618a7f4"
        );
    }

    #[test]
    fn test_parse_failed_simulation_message() {
        // "REVERT opcode executed"
        let response: TriggerResponse = serde_json::from_value(json!({
            "result": {
                "code": "CONTRACT_EXE_ERROR",
                "message": "524556455254206f70636f6465206578656375746564"
            }
        }))
        .unwrap();

        let outcome = response.into_outcome().unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("REVERT opcode executed"));
        assert!(outcome.transaction.is_none());
    }

    #[test]
    fn test_parse_failed_transaction_code() {
        let response: TriggerResponse = serde_json::from_value(json!({
            "result": { "result": true },
            "constant_result": [""],
            "transaction": {
                "ret": [{ "ret": "FAILED" }],
                "raw_data_hex": "0a02abcd"
            }
        }))
        .unwrap();

        let outcome = response.into_outcome().unwrap();
        assert!(outcome.transaction.unwrap().is_failed());
    }

    #[test]
    fn test_parse_request_error() {
        let response: TriggerResponse = serde_json::from_value(json!({
            "Error": "class org.tron.core.exception.BadItemException : invalid address"
        }))
        .unwrap();

        let outcome = response.into_outcome().unwrap();
        assert!(!outcome.success);
        assert_eq!(
            outcome.message.as_deref(),
            Some("class org.tron.core.exception.BadItemException : invalid address")
        );
    }

    #[test]
    fn test_broadcast_rejection() {
        let response: BroadcastResponse = serde_json::from_value(json!({
            "result": false,
            "code": "SIGERROR",
            "message": "76616c6964617465207369676e6174757265206572726f72"
        }))
        .unwrap();

        match response.into_result() {
            Err(Error::TransactionRejected(msg)) => {
                assert_eq!(msg, "validate signature error")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_broadcast_accepted() {
        let response: BroadcastResponse =
            serde_json::from_value(json!({ "result": true, "txid": "ab" })).unwrap();
        assert!(response.into_result().is_ok());
    }

    #[test]
    fn test_decode_message_falls_back_to_raw() {
        assert_eq!(decode_message("not hex"), "not hex");
    }
}
