//! JSON-RPC 2.0 client with multi-endpoint failover.
//!
//! Endpoints are tried starting from the last one that answered, wrapping
//! around the configured list. Only transport-level failures rotate to the
//! next endpoint; a definitive answer from a node (a 4xx or a JSON-RPC
//! error object) is returned to the caller as-is, because every healthy
//! node would say the same thing.

use crate::error::{Result, WalletError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Default per-request timeout.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for broadcasts, which the chain may take longer to accept.
pub const BROADCAST_TIMEOUT: Duration = Duration::from_secs(20);

/// Per-call knobs.
#[derive(Clone, Copy, Debug)]
pub struct CallOptions {
    /// Deadline for each HTTP attempt.
    pub timeout: Duration,
    /// Whether to rotate through the remaining endpoints on retryable
    /// failures. When false only the current preferred endpoint is tried.
    pub allow_failover: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_RPC_TIMEOUT,
            allow_failover: true,
        }
    }
}

impl CallOptions {
    /// Options for transaction broadcasts.
    pub fn broadcast() -> Self {
        Self {
            timeout: BROADCAST_TIMEOUT,
            allow_failover: true,
        }
    }

    /// Override the per-attempt timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: &'a Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

/// A JSON-RPC error object.
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Server-provided message.
    pub message: String,
}

/// The chain identity triple advertised by a node.
#[derive(Clone, Debug, Deserialize)]
pub struct SyncInfo {
    /// Chain id, as a decimal or `0x` hex string.
    pub chain_id: String,
    /// Network identifier.
    pub network_id: String,
    /// Genesis block hash.
    pub genesis_hash: String,
}

/// Request object for `catalyst_estimateFee`.
#[derive(Debug, Serialize)]
pub struct FeeEstimateRequest {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Transfer value as a decimal string.
    pub value: String,
    /// Unused for plain transfers; serialized as `null`.
    pub data: Option<String>,
    /// Unused for plain transfers; serialized as `null`.
    pub gas_limit: Option<u64>,
    /// Unused for plain transfers; serialized as `null`.
    pub gas_price: Option<u64>,
}

impl FeeEstimateRequest {
    /// The request shape for a plain value transfer.
    pub fn transfer(from: &str, to: &str, amount: u64) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            value: amount.to_string(),
            data: None,
            gas_limit: None,
            gas_price: None,
        }
    }
}

/// JSON-RPC client over HTTP POST with endpoint failover.
pub struct RpcClient {
    urls: Vec<String>,
    http: reqwest::Client,
    next_id: u64,
    last_good: usize,
}

impl RpcClient {
    /// Create a client over an ordered endpoint list; the first entry is
    /// initially preferred.
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            urls,
            http: reqwest::Client::new(),
            next_id: 1,
            last_good: 0,
        }
    }

    /// Index of the endpoint that most recently answered.
    pub fn last_good(&self) -> usize {
        self.last_good
    }

    /// Prefer the endpoint with the given URL, if configured. Returns
    /// whether it was found.
    pub fn prefer_url(&mut self, url: &str) -> bool {
        match self.urls.iter().position(|u| u == url) {
            Some(index) => {
                self.last_good = index;
                true
            }
            None => false,
        }
    }

    /// The currently preferred endpoint URL.
    pub fn preferred_url(&self) -> Option<&str> {
        self.urls.get(self.last_good).map(String::as_str)
    }

    /// Perform a JSON-RPC call, rotating endpoints per `opts`.
    pub async fn call(&mut self, method: &str, params: Value, opts: CallOptions) -> Result<Value> {
        if self.urls.is_empty() {
            return Err(WalletError::RpcUnreachable(
                "no endpoints configured".to_string(),
            ));
        }

        let candidates = if opts.allow_failover {
            self.urls.len()
        } else {
            1
        };

        let mut last_error = None;
        for offset in 0..candidates {
            let index = (self.last_good + offset) % self.urls.len();
            match self.call_url(index, method, &params, opts.timeout).await {
                Ok(result) => {
                    self.last_good = index;
                    return Ok(result);
                }
                Err((error, retryable)) => {
                    if !retryable {
                        return Err(error);
                    }
                    warn!(
                        "rpc endpoint {} failed {}: {}",
                        self.urls[index], method, error
                    );
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            WalletError::RpcUnreachable("no endpoints tried".to_string())
        }))
    }

    /// One attempt against one endpoint. The boolean in the error marks
    /// failover eligibility.
    async fn call_url(
        &mut self,
        index: usize,
        method: &str,
        params: &Value,
        timeout: Duration,
    ) -> std::result::Result<Value, (WalletError, bool)> {
        let id = self.next_id;
        self.next_id += 1;

        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        let response = self
            .http
            .post(&self.urls[index])
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    (WalletError::RpcTimeout, true)
                } else {
                    // No HTTP response at all.
                    (WalletError::RpcTransport(e.to_string()), true)
                }
            })?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err((WalletError::RpcHttp(status), status_is_retryable(status)));
        }

        let body: JsonRpcResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                (WalletError::RpcTimeout, true)
            } else {
                (WalletError::RpcResponse(e.to_string()), false)
            }
        })?;

        if let Some(error) = body.error {
            debug!("rpc {} returned error {}: {}", method, error.code, error.message);
            return Err((
                WalletError::RpcProtocol {
                    code: error.code,
                    message: error.message,
                },
                false,
            ));
        }

        body.result
            .ok_or_else(|| (WalletError::RpcResponse("missing result".to_string()), false))
    }

    /// `catalyst_getSyncInfo`: the chain identity triple in one call.
    pub async fn get_sync_info(&mut self) -> Result<SyncInfo> {
        let value = self
            .call("catalyst_getSyncInfo", json!([]), CallOptions::default())
            .await?;
        serde_json::from_value(value).map_err(|e| WalletError::RpcResponse(e.to_string()))
    }

    /// `catalyst_chainId`.
    pub async fn chain_id(&mut self) -> Result<String> {
        self.call_string("catalyst_chainId").await
    }

    /// `catalyst_networkId`.
    pub async fn network_id(&mut self) -> Result<String> {
        self.call_string("catalyst_networkId").await
    }

    /// `catalyst_genesisHash`.
    pub async fn genesis_hash(&mut self) -> Result<String> {
        self.call_string("catalyst_genesisHash").await
    }

    async fn call_string(&mut self, method: &str) -> Result<String> {
        let value = self.call(method, json!([]), CallOptions::default()).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| WalletError::RpcResponse(format!("{method}: expected a string")))
    }

    /// `catalyst_getBalance`: the balance as an unbounded integer.
    pub async fn get_balance(&mut self, address: &str) -> Result<u128> {
        let value = self
            .call("catalyst_getBalance", json!([address]), CallOptions::default())
            .await?;
        parse_decimal_u128(&value)
    }

    /// `catalyst_getNonce`: the sender's committed nonce.
    pub async fn get_nonce(&mut self, address: &str) -> Result<u64> {
        let value = self
            .call("catalyst_getNonce", json!([address]), CallOptions::default())
            .await?;
        parse_decimal_u64(&value)
    }

    /// `catalyst_estimateFee` for a plain transfer.
    pub async fn estimate_fee(&mut self, request: &FeeEstimateRequest) -> Result<u64> {
        let value = self
            .call(
                "catalyst_estimateFee",
                json!([request]),
                CallOptions::default(),
            )
            .await?;
        parse_decimal_u64(&value)
    }

    /// `catalyst_sendRawTransaction`: broadcast wire bytes, returning the
    /// server-side transaction id. Uses the longer broadcast timeout.
    pub async fn send_raw_transaction(&mut self, wire_hex: &str) -> Result<String> {
        let value = self
            .call(
                "catalyst_sendRawTransaction",
                json!([wire_hex]),
                CallOptions::broadcast(),
            )
            .await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| WalletError::RpcResponse("expected a tx id string".to_string()))
    }

    /// `catalyst_getTransactionReceipt`: `None` while the transaction is
    /// unknown to the node.
    pub async fn get_transaction_receipt(&mut self, id: &str) -> Result<Option<Value>> {
        let value = self
            .call(
                "catalyst_getTransactionReceipt",
                json!([id]),
                CallOptions::default(),
            )
            .await?;
        Ok(if value.is_null() { None } else { Some(value) })
    }

    /// `catalyst_getTransactionsByAddress`: recent transaction summaries.
    pub async fn get_transactions_by_address(
        &mut self,
        address: &str,
        from_cycle: Option<u64>,
        limit: u32,
    ) -> Result<Vec<Value>> {
        let value = self
            .call(
                "catalyst_getTransactionsByAddress",
                json!([address, from_cycle, limit]),
                CallOptions::default(),
            )
            .await?;
        serde_json::from_value(value).map_err(|e| WalletError::RpcResponse(e.to_string()))
    }
}

/// Whether an HTTP status justifies trying the next endpoint.
///
/// Server-side trouble (5xx), timeouts (408) and throttling (429) are
/// endpoint-specific; any other 4xx means the request itself is bad.
fn status_is_retryable(status: u16) -> bool {
    status >= 500 || status == 408 || status == 429
}

fn parse_decimal_u128(value: &Value) -> Result<u128> {
    match value {
        Value::String(s) => s
            .parse::<u128>()
            .map_err(|_| WalletError::RpcResponse(format!("bad decimal string: {s}"))),
        Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| WalletError::RpcResponse(format!("bad number: {n}"))),
        other => Err(WalletError::RpcResponse(format!(
            "expected a decimal value, got {other}"
        ))),
    }
}

fn parse_decimal_u64(value: &Value) -> Result<u64> {
    match value {
        Value::String(s) => s
            .parse::<u64>()
            .map_err(|_| WalletError::RpcResponse(format!("bad decimal string: {s}"))),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| WalletError::RpcResponse(format!("bad number: {n}"))),
        other => Err(WalletError::RpcResponse(format!(
            "expected a decimal value, got {other}"
        ))),
    }
}
