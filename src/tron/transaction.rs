//! Unsigned and signed Tron transactions
//!
//! The node hands back the transaction body as protobuf-encoded `raw_data`.
//! We never model the whole schema: the body is kept as bytes and the only
//! field we touch, `fee_limit`, is rewritten at the wire level so every other
//! field survives untouched. The transaction id is the SHA-256 of those bytes.

use crate::{Error, Result};
use alloy::hex;
use alloy::primitives::B256;
use prost::encoding::{decode_key, decode_varint, encode_key, encode_varint, skip_field};
use prost::encoding::{DecodeContext, WireType};
use prost::Message;
use sha2::{Digest, Sha256};
use std::fmt;

/// `Transaction.raw.fee_limit`
const FEE_LIMIT_TAG: u32 = 18;

/// Wire form of `protocol.Transaction`, minus the `ret` list the node
/// ignores on broadcast
#[derive(Clone, PartialEq, Message)]
struct TransactionProto {
    #[prost(bytes = "vec", tag = "1")]
    raw_data: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    signature: Vec<Vec<u8>>,
}

/// Transaction id: SHA-256 of the raw transaction body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxId(pub B256);

impl TxId {
    fn of(raw_data: &[u8]) -> Self {
        Self(B256::from_slice(&Sha256::digest(raw_data)))
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tron explorers show ids without a 0x prefix
        f.write_str(&hex::encode(self.0))
    }
}

/// Transaction body returned by a simulation, not yet signed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    raw_data: Vec<u8>,
    failed: bool,
}

impl PendingTransaction {
    /// Wrap a raw body. `failed` mirrors the result code the node embedded
    /// in the simulated transaction.
    pub fn new(raw_data: Vec<u8>, failed: bool) -> Self {
        Self { raw_data, failed }
    }

    /// Parse the node's `raw_data_hex`
    pub fn from_hex(raw_data_hex: &str, failed: bool) -> Result<Self> {
        let raw_data = hex::decode(raw_data_hex)
            .map_err(|e| Error::MalformedTransaction(format!("raw_data_hex: {}", e)))?;
        Ok(Self::new(raw_data, failed))
    }

    /// Whether the node already reports this transaction as failed
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn raw_data(&self) -> &[u8] {
        &self.raw_data
    }

    /// Id the transaction will have once signed with the current body
    pub fn txid(&self) -> TxId {
        TxId::of(&self.raw_data)
    }

    /// Set the fee ceiling (in sun), replacing any value already present
    pub fn set_fee_limit(&mut self, fee_limit_sun: u64) -> Result<()> {
        let mut body = Vec::with_capacity(self.raw_data.len() + 6);
        for field in fields(&self.raw_data)? {
            if field.tag != FEE_LIMIT_TAG {
                body.extend_from_slice(&self.raw_data[field.start..field.end]);
            }
        }
        encode_key(FEE_LIMIT_TAG, WireType::Varint, &mut body);
        encode_varint(fee_limit_sun, &mut body);
        self.raw_data = body;
        Ok(())
    }

    /// Read back the fee ceiling, if one is set
    pub fn fee_limit(&self) -> Result<Option<u64>> {
        let mut found = None;
        for field in fields(&self.raw_data)? {
            if field.tag == FEE_LIMIT_TAG && field.wire_type == WireType::Varint {
                let mut value = &self.raw_data[field.value_start..field.end];
                found = Some(decode_varint(&mut value).map_err(malformed)?);
            }
        }
        Ok(found)
    }

    /// Attach a 65-byte recoverable signature over [`PendingTransaction::txid`]
    pub fn into_signed(self, signature: [u8; 65]) -> SignedTransaction {
        let txid = self.txid();
        SignedTransaction {
            raw_data: self.raw_data,
            signature,
            txid,
        }
    }
}

/// A signed transaction. Immutable: the body cannot change after signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    raw_data: Vec<u8>,
    signature: [u8; 65],
    txid: TxId,
}

impl SignedTransaction {
    pub fn txid(&self) -> TxId {
        self.txid
    }

    pub fn signature(&self) -> &[u8; 65] {
        &self.signature
    }

    /// Protobuf `Transaction { raw_data, signature }` as sent to `broadcasthex`
    pub fn encode(&self) -> Vec<u8> {
        TransactionProto {
            raw_data: self.raw_data.clone(),
            signature: vec![self.signature.to_vec()],
        }
        .encode_to_vec()
    }
}

fn malformed(e: prost::DecodeError) -> Error {
    Error::MalformedTransaction(e.to_string())
}

/// One top-level field of the body, located by byte offsets
struct Field {
    tag: u32,
    wire_type: WireType,
    start: usize,
    value_start: usize,
    end: usize,
}

/// Split a body into its top-level fields without interpreting them
fn fields(raw: &[u8]) -> Result<Vec<Field>> {
    let mut buf = raw;
    let mut out = Vec::new();
    while !buf.is_empty() {
        let start = raw.len() - buf.len();
        let (tag, wire_type) = decode_key(&mut buf).map_err(malformed)?;
        let value_start = raw.len() - buf.len();
        skip_field(wire_type, tag, &mut buf, DecodeContext::default()).map_err(malformed)?;
        out.push(Field {
            tag,
            wire_type,
            start,
            value_start,
            end: raw.len() - buf.len(),
        });
    }
    Ok(out)
}
