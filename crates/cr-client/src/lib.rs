//! Read-only clients for the external services chain verification depends on.
//!
//! The verification core consumes two capabilities and implements neither:
//! [`AnchorTransport`] (ledger transaction lookup plus best-effort address
//! history) and [`BlobStore`] (off-chain document and tag retrieval). The
//! production implementations here speak EVM JSON-RPC, an Etherscan-style
//! explorer API and an Arweave gateway, all through `reqwest`. Tests and
//! self-hosted deployments substitute their own implementations.

pub mod arweave;
pub mod retry;
pub mod rpc;

mod error;

pub use arweave::{ArweaveConfig, ArweaveGateway};
pub use error::TransportError;
pub use retry::RetryPolicy;
pub use rpc::{EvmRpc, EvmRpcConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A ledger transaction reduced to what verification needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// `0x`-prefixed transaction hash.
    pub hash: String,
    /// Raw payload bytes (already hex-decoded; may be any length).
    pub data: Vec<u8>,
}

/// A name/value metadata tag on an off-chain document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

/// Read access to ledger transactions.
///
/// `transactions_from` is backed by an external indexing service; it is
/// best-effort and eventually consistent, and callers must not assume a
/// complete or ordered result set.
#[async_trait]
pub trait AnchorTransport: Send + Sync {
    async fn get_transaction(&self, tx_hash: &str) -> Result<RawTransaction, TransportError>;

    async fn transactions_from(&self, address: &str)
        -> Result<Vec<RawTransaction>, TransportError>;
}

/// Read access to off-chain documents and their metadata tags.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get_document(&self, id: &str) -> Result<Value, TransportError>;

    async fn get_document_tags(&self, id: &str) -> Result<Vec<Tag>, TransportError>;
}
