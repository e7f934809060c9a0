//! Typed JSON-RPC calls over a wallet capability
//!
//! `LedgerRpc` shapes the handful of methods the gateway needs; it does not
//! try to be a general client. `HttpRpcProvider` exposes a plain HTTP
//! JSON-RPC endpoint through the same capability trait for unattended
//! read paths (diagnostics, registry queries); methods that only exist
//! inside a wallet extension are rejected there.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::chain::abi::{self, ReturnData};
use crate::error::{Error, Result};
use crate::wallet::{WalletCapability, WalletRpcError, CODE_UNSUPPORTED_METHOD};

/// Receipt returned by `eth_getTransactionReceipt`
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    /// `"0x1"` on success, `"0x0"` on revert
    pub status: Option<String>,
    pub block_number: Option<String>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.as_deref() == Some("0x1")
    }
}

/// One event emitted during the transaction
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
}

pub struct LedgerRpc {
    provider: Arc<dyn WalletCapability>,
}

impl LedgerRpc {
    pub fn new(provider: Arc<dyn WalletCapability>) -> Self {
        Self { provider }
    }

    /// Active chain id (`eth_chainId`)
    pub async fn chain_id(&self) -> Result<u64> {
        let value = self.provider.request("eth_chainId", json!([])).await?;
        let raw = value.as_str().ok_or_else(|| {
            Error::MalformedResponse("eth_chainId did not return a string".to_string())
        })?;
        u64::try_from(abi::parse_quantity(raw)?)
            .map_err(|_| Error::MalformedResponse(format!("chain id {raw:?} exceeds 64 bits")))
    }

    /// Read-only contract call (`eth_call` at the latest block)
    pub async fn call(&self, to: &str, data: &[u8]) -> Result<ReturnData> {
        let value = self
            .provider
            .request(
                "eth_call",
                json!([{ "to": to, "data": abi::to_hex(data) }, "latest"]),
            )
            .await?;
        let raw = value.as_str().ok_or_else(|| {
            Error::MalformedResponse("eth_call did not return a string".to_string())
        })?;
        ReturnData::from_hex(raw)
    }

    /// Submit a transaction through the wallet; the wallet signs and
    /// broadcasts. Returns the transaction hash.
    pub async fn send_transaction(
        &self,
        from: &str,
        to: &str,
        value: Option<u128>,
        data: &[u8],
    ) -> Result<String> {
        let mut tx = json!({
            "from": from,
            "to": to,
            "data": abi::to_hex(data),
        });
        if let Some(value) = value {
            tx["value"] = Value::String(abi::quantity_hex(value));
        }
        let result = self
            .provider
            .request("eth_sendTransaction", json!([tx]))
            .await?;
        result
            .as_str()
            .filter(|hash| !hash.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::MalformedResponse(
                    "eth_sendTransaction did not return a transaction hash".to_string(),
                )
            })
    }

    /// Receipt lookup; `None` while the transaction is still pending
    pub async fn transaction_receipt(&self, hash: &str) -> Result<Option<TransactionReceipt>> {
        let value = self
            .provider
            .request("eth_getTransactionReceipt", json!([hash]))
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }
}

/// Methods that only exist inside a wallet extension
const WALLET_ONLY_METHODS: &[&str] = &[
    "eth_requestAccounts",
    "eth_sendTransaction",
    "wallet_switchEthereumChain",
    "wallet_addEthereumChain",
];

/// Direct HTTP JSON-RPC endpoint exposed as a `WalletCapability`.
///
/// Covers the unattended read paths: chain id checks, contract calls and
/// receipt lookups against a public RPC URL. Anything that needs a signer
/// or the wallet's own management surface fails with the
/// unsupported-method code.
pub struct HttpRpcProvider {
    client: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl HttpRpcProvider {
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl WalletCapability for HttpRpcProvider {
    fn provider_name(&self) -> &str {
        "json-rpc"
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletRpcError> {
        if WALLET_ONLY_METHODS.contains(&method) {
            return Err(WalletRpcError::new(
                CODE_UNSUPPORTED_METHOD,
                format!("{method} requires a wallet extension"),
            ));
        }
        let body = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });
        debug!(method, endpoint = %self.endpoint, "JSON-RPC request");
        let response: Value = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| WalletRpcError::new(-32000, format!("transport error: {e}")))?
            .json()
            .await
            .map_err(|e| WalletRpcError::new(-32700, format!("malformed response: {e}")))?;
        if let Some(err) = response.get("error") {
            let code = err.get("code").and_then(Value::as_i64).unwrap_or(-32000);
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error");
            return Err(WalletRpcError::new(code, message));
        }
        Ok(response.get("result").cloned().unwrap_or(Value::Null))
    }
}
