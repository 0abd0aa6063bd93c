//! JSON-RPC ledger client over HTTP.
//!
//! Thin transport: one POST per call, hex-quantity parsing, and a polling
//! loop for inclusion receipts. Anything the endpoint reports as an error
//! object comes back as [`TokenError::Rpc`]; the orchestration layers decide
//! what that means for the operation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::{InclusionReceipt, LedgerClient};
use crate::config::Config;
use crate::error::{TokenError, TokenResult};

pub struct HttpLedgerClient {
    http: reqwest::Client,
    url: String,
    receipt_poll_interval: Duration,
    receipt_timeout: Duration,
    request_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RawReceipt {
    status: Option<String>,
}

impl HttpLedgerClient {
    pub fn new(config: &Config) -> TokenResult<Self> {
        Self::with_settings(
            &config.rpc.url,
            Duration::from_secs(config.rpc.timeout_secs),
            Duration::from_millis(config.submission.receipt_poll_interval_ms),
            Duration::from_secs(config.submission.receipt_timeout_secs),
        )
    }

    pub fn with_settings(
        url: &str,
        request_timeout: Duration,
        receipt_poll_interval: Duration,
        receipt_timeout: Duration,
    ) -> TokenResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|err| TokenError::Initialization(format!("HTTP client: {err}")))?;

        Ok(Self {
            http,
            url: url.to_string(),
            receipt_poll_interval,
            receipt_timeout,
            request_id: AtomicU64::new(1),
        })
    }

    fn rpc_error(&self, message: impl Into<String>) -> TokenError {
        TokenError::Rpc {
            endpoint: Some(self.url.clone()),
            message: message.into(),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> TokenResult<T> {
        self.request_optional(method, params)
            .await?
            .ok_or_else(|| self.rpc_error(format!("{method}: missing result")))
    }

    /// Like [`request`], but a `null` result is a valid answer (the pending
    /// state of a receipt lookup).
    async fn request_optional<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> TokenResult<Option<T>> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, "ledger request");

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|err| self.rpc_error(format!("{method}: {err}")))?;

        let response: RpcResponse<T> = response
            .json()
            .await
            .map_err(|err| self.rpc_error(format!("{method}: malformed response: {err}")))?;

        if let Some(err) = response.error {
            return Err(self.rpc_error(format!("{method}: {} (code {})", err.message, err.code)));
        }

        Ok(response.result)
    }

    async fn request_quantity(&self, method: &str, params: serde_json::Value) -> TokenResult<u128> {
        let raw: String = self.request(method, params).await?;
        parse_quantity(&raw).ok_or_else(|| self.rpc_error(format!("{method}: bad quantity {raw:?}")))
    }
}

/// Parse a 0x-prefixed hex quantity.
fn parse_quantity(raw: &str) -> Option<u128> {
    let digits = raw.strip_prefix("0x")?;
    u128::from_str_radix(digits, 16).ok()
}

fn to_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn pending_nonce(&self, address: Address) -> TokenResult<u64> {
        let nonce = self
            .request_quantity(
                "eth_getTransactionCount",
                json!([format!("{address:#x}"), "pending"]),
            )
            .await?;
        Ok(nonce as u64)
    }

    async fn gas_price(&self) -> TokenResult<u128> {
        self.request_quantity("eth_gasPrice", json!([])).await
    }

    #[instrument(skip(self, data))]
    async fn estimate_gas(&self, from: Address, to: Address, data: &[u8]) -> TokenResult<u64> {
        let gas = self
            .request_quantity(
                "eth_estimateGas",
                json!([{
                    "from": format!("{from:#x}"),
                    "to": format!("{to:#x}"),
                    "data": to_hex(data),
                }]),
            )
            .await?;
        Ok(gas as u64)
    }

    #[instrument(skip(self, raw))]
    async fn send_raw_transaction(&self, raw: &[u8]) -> TokenResult<B256> {
        let hash: String = self
            .request("eth_sendRawTransaction", json!([to_hex(raw)]))
            .await?;
        hash.parse::<B256>()
            .map_err(|_| self.rpc_error(format!("bad transaction hash {hash:?}")))
    }

    #[instrument(skip(self))]
    async fn wait_for_inclusion(&self, tx_hash: B256) -> TokenResult<InclusionReceipt> {
        let deadline = tokio::time::Instant::now() + self.receipt_timeout;

        loop {
            let receipt: Option<RawReceipt> = self
                .request_optional("eth_getTransactionReceipt", json!([format!("{tx_hash:#x}")]))
                .await?;

            if let Some(receipt) = receipt {
                let success = receipt.status.as_deref() == Some("0x1");
                return Ok(InclusionReceipt { tx_hash, success });
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(self.rpc_error(format!(
                    "no receipt for {tx_hash:#x} after {:?}",
                    self.receipt_timeout
                )));
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }

    async fn call(&self, to: Address, data: &[u8]) -> TokenResult<Vec<u8>> {
        let result: String = self
            .request(
                "eth_call",
                json!([{
                    "to": format!("{to:#x}"),
                    "data": to_hex(data),
                }, "latest"]),
            )
            .await?;
        let digits = result.strip_prefix("0x").unwrap_or(&result);
        hex::decode(digits).map_err(|_| self.rpc_error(format!("bad call result {result:?}")))
    }
}
