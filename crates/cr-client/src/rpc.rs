//! EVM ledger access: transaction lookup over JSON-RPC and address history
//! over an Etherscan-compatible explorer API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{AnchorTransport, RawTransaction, TransportError};

/// Public Polygon RPC endpoint used when no override is given.
pub const DEFAULT_RPC_URL: &str = "https://polygon-bor-rpc.publicnode.com";

/// Etherscan-style explorer API for address transaction history.
pub const DEFAULT_EXPLORER_URL: &str = "https://api.polygonscan.com/api";

/// Configuration for [`EvmRpc`].
#[derive(Debug, Clone)]
pub struct EvmRpcConfig {
    pub rpc_url: String,
    pub explorer_url: String,
    pub explorer_api_key: Option<String>,
}

impl Default for EvmRpcConfig {
    fn default() -> Self {
        EvmRpcConfig {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            explorer_api_key: None,
        }
    }
}

/// [`AnchorTransport`] backed by an EVM JSON-RPC node plus a block explorer.
///
/// Calls are single-shot; timeout and retry are layered on by the caller
/// through [`crate::RetryPolicy`].
pub struct EvmRpc {
    client: Client,
    config: EvmRpcConfig,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    message: Option<String>,
    result: Value,
}

#[derive(Debug, Deserialize)]
struct ExplorerTx {
    hash: String,
    #[serde(default)]
    input: String,
}

impl EvmRpc {
    pub fn new(config: EvmRpcConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let resp = self
            .client
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(TransportError::Http(resp.status().as_u16()));
        }
        let parsed: RpcResponse = resp.json().await?;
        if let Some(err) = parsed.error {
            return Err(TransportError::Rpc(err.message));
        }
        Ok(parsed.result.unwrap_or(Value::Null))
    }
}

/// Extract hash + payload bytes from an `eth_getTransactionByHash` result.
///
/// A null result means the transaction does not exist; a transaction with
/// empty input carries no payload and is reported as not found, matching
/// how the verifier treats bare value transfers.
fn parse_rpc_transaction(result: &Value) -> Result<RawTransaction, TransportError> {
    let tx = match result {
        Value::Null => return Err(TransportError::NotFound),
        Value::Object(tx) => tx,
        other => {
            return Err(TransportError::BadResponse(format!(
                "expected transaction object, got {other}"
            )))
        }
    };
    let hash = tx
        .get("hash")
        .and_then(Value::as_str)
        .ok_or_else(|| TransportError::BadResponse("transaction without hash".to_string()))?;
    let input = tx.get("input").and_then(Value::as_str).unwrap_or("0x");
    if input.is_empty() || input == "0x" {
        return Err(TransportError::NotFound);
    }
    let data = hex::decode(input.trim_start_matches("0x"))
        .map_err(|e| TransportError::BadResponse(format!("bad input hex: {e}")))?;
    Ok(RawTransaction {
        hash: hash.to_string(),
        data,
    })
}

/// Turn an explorer `txlist` payload into raw transactions.
///
/// Entries with missing or undecodable input are skipped rather than failing
/// the whole page; the walker filters by payload shape anyway.
fn parse_explorer_response(resp: ExplorerResponse) -> Result<Vec<RawTransaction>, TransportError> {
    if resp.message.as_deref() == Some("No transactions found") {
        return Ok(Vec::new());
    }
    let list = match resp.result {
        Value::Array(list) => list,
        Value::String(err) => return Err(TransportError::Rpc(err)),
        other => {
            return Err(TransportError::BadResponse(format!(
                "expected transaction list, got {other}"
            )))
        }
    };
    let mut out = Vec::new();
    for entry in list {
        let Ok(tx) = serde_json::from_value::<ExplorerTx>(entry) else {
            continue;
        };
        let Ok(data) = hex::decode(tx.input.trim_start_matches("0x")) else {
            continue;
        };
        out.push(RawTransaction { hash: tx.hash, data });
    }
    Ok(out)
}

#[async_trait]
impl AnchorTransport for EvmRpc {
    async fn get_transaction(&self, tx_hash: &str) -> Result<RawTransaction, TransportError> {
        debug!(tx_hash, "fetching transaction");
        let result = self
            .rpc_call("eth_getTransactionByHash", json!([tx_hash]))
            .await?;
        parse_rpc_transaction(&result)
    }

    async fn transactions_from(
        &self,
        address: &str,
    ) -> Result<Vec<RawTransaction>, TransportError> {
        debug!(address, "fetching address transaction history");
        let mut url = format!(
            "{}?module=account&action=txlist&address={address}\
             &startblock=0&endblock=99999999&sort=asc&page=1&offset=500",
            self.config.explorer_url
        );
        if let Some(key) = &self.config.explorer_api_key {
            url.push_str("&apikey=");
            url.push_str(key);
        }
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(TransportError::Http(resp.status().as_u16()));
        }
        let parsed: ExplorerResponse = resp.json().await?;
        parse_explorer_response(parsed)
    }
}
