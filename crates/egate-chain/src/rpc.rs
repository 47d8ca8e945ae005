//! # JSON-RPC Client
//!
//! A thin typed layer over `reqwest` speaking JSON-RPC 2.0. Every request
//! either yields its `result` or a [`ChainError`] naming the method.

use std::time::Duration;

use egate_core::{to_hex_prefixed, EthAddress, Wei};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::ChainConfig;
use crate::error::ChainError;

/// A mined transaction receipt, reduced to the fields the workflow reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    /// `0x1` success, `0x0` reverted. Pre-Byzantium nodes omit it.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub gas_used: Option<String>,
}

impl TxReceipt {
    /// True unless the receipt reports status `0x0`.
    pub fn succeeded(&self) -> bool {
        !matches!(self.status.as_deref(), Some("0x0") | Some("0x00"))
    }

    /// Block number as an integer, when present and well-formed.
    pub fn block(&self) -> Option<u64> {
        self.block_number
            .as_deref()
            .and_then(|q| parse_quantity(q).ok())
            .and_then(|v| u64::try_from(v).ok())
    }
}

/// Transaction fields for `eth_estimateGas`.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub from: EthAddress,
    pub to: Option<EthAddress>,
    pub value: Wei,
    pub data: Vec<u8>,
}

impl CallRequest {
    fn to_json(&self) -> Value {
        let mut obj = json!({
            "from": self.from.to_checksum(),
            "value": self.value.to_quantity(),
            "data": to_hex_prefixed(&self.data),
        });
        if let Some(to) = &self.to {
            obj["to"] = Value::String(to.to_checksum());
        }
        obj
    }
}

/// JSON-RPC client for one endpoint.
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: reqwest::Client,
    config: ChainConfig,
}

impl RpcClient {
    /// Build a client with the configured request timeout.
    pub fn new(config: ChainConfig) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChainError::Http {
                method: "client_init".into(),
                source: e,
            })?;
        Ok(Self { client, config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Issue one JSON-RPC request and return its `result`.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        tracing::debug!(method, "rpc request");

        let resp = self
            .client
            .post(self.config.rpc_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Http {
                method: method.to_string(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChainError::Status {
                method: method.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = resp.json().await.map_err(|e| ChainError::Decode {
            method: method.to_string(),
            reason: format!("invalid JSON response: {e}"),
        })?;

        if let Some(error) = json.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error");
            return Err(ChainError::Rpc {
                method: method.to_string(),
                code,
                message: message.to_string(),
            });
        }

        json.get("result").cloned().ok_or_else(|| ChainError::Decode {
            method: method.to_string(),
            reason: "response has neither result nor error".into(),
        })
    }

    async fn request_quantity(&self, method: &str, params: Value) -> Result<u128, ChainError> {
        let value = self.request(method, params).await?;
        let text = value.as_str().ok_or_else(|| ChainError::Decode {
            method: method.to_string(),
            reason: format!("expected hex quantity, got {value}"),
        })?;
        parse_quantity(text).map_err(|reason| ChainError::Decode {
            method: method.to_string(),
            reason,
        })
    }

    /// `eth_chainId`
    pub async fn chain_id(&self) -> Result<u64, ChainError> {
        let id = self.request_quantity("eth_chainId", json!([])).await?;
        u64::try_from(id).map_err(|_| ChainError::Decode {
            method: "eth_chainId".into(),
            reason: format!("chain id {id} does not fit in u64"),
        })
    }

    /// `eth_getTransactionCount` against the pending block.
    pub async fn transaction_count(&self, address: &EthAddress) -> Result<u64, ChainError> {
        let n = self
            .request_quantity(
                "eth_getTransactionCount",
                json!([address.to_checksum(), "pending"]),
            )
            .await?;
        u64::try_from(n).map_err(|_| ChainError::Decode {
            method: "eth_getTransactionCount".into(),
            reason: format!("nonce {n} does not fit in u64"),
        })
    }

    /// `eth_gasPrice`
    pub async fn gas_price(&self) -> Result<u128, ChainError> {
        self.request_quantity("eth_gasPrice", json!([])).await
    }

    /// `eth_getBalance` at the latest block.
    pub async fn balance(&self, address: &EthAddress) -> Result<Wei, ChainError> {
        self.request_quantity("eth_getBalance", json!([address.to_checksum(), "latest"]))
            .await
            .map(Wei)
    }

    /// `eth_estimateGas`
    pub async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, ChainError> {
        let gas = self
            .request_quantity("eth_estimateGas", json!([call.to_json()]))
            .await?;
        u64::try_from(gas).map_err(|_| ChainError::Decode {
            method: "eth_estimateGas".into(),
            reason: format!("gas estimate {gas} does not fit in u64"),
        })
    }

    /// `eth_call` at the latest block; returns the raw return data.
    pub async fn call(&self, to: &EthAddress, data: &[u8]) -> Result<Vec<u8>, ChainError> {
        let result = self
            .request(
                "eth_call",
                json!([{ "to": to.to_checksum(), "data": to_hex_prefixed(data) }, "latest"]),
            )
            .await?;
        let text = result.as_str().ok_or_else(|| ChainError::Decode {
            method: "eth_call".into(),
            reason: format!("expected hex data, got {result}"),
        })?;
        egate_core::decode_hex_prefixed(text, "eth_call result").map_err(|e| ChainError::Decode {
            method: "eth_call".into(),
            reason: e.to_string(),
        })
    }

    /// `eth_sendRawTransaction`; returns the transaction hash.
    pub async fn send_raw_transaction(&self, raw_hex: &str) -> Result<String, ChainError> {
        let result = self
            .request("eth_sendRawTransaction", json!([raw_hex]))
            .await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ChainError::Decode {
                method: "eth_sendRawTransaction".into(),
                reason: "returned non-string result".into(),
            })
    }

    /// `eth_getTransactionReceipt`; `None` while pending.
    pub async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, ChainError> {
        let result = self
            .request("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        serde_json::from_value(result)
            .map(Some)
            .map_err(|e| ChainError::Decode {
                method: "eth_getTransactionReceipt".into(),
                reason: e.to_string(),
            })
    }

    /// Poll for a receipt until it appears or the confirmation window closes.
    ///
    /// A receipt with status `0x0` is returned as [`ChainError::Reverted`].
    pub async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TxReceipt, ChainError> {
        let interval = Duration::from_millis(self.config.poll_interval_ms.max(1));
        // No deadline when the ceiling is past the clock's range.
        let deadline = tokio::time::Instant::now()
            .checked_add(Duration::from_secs(self.config.confirm_timeout_secs));

        loop {
            if let Some(receipt) = self.transaction_receipt(tx_hash).await? {
                if !receipt.succeeded() {
                    return Err(ChainError::Reverted {
                        tx_hash: tx_hash.to_string(),
                    });
                }
                tracing::info!(tx_hash, block = ?receipt.block(), "transaction confirmed");
                return Ok(receipt);
            }
            let expired = deadline.is_some_and(|deadline| {
                tokio::time::Instant::now()
                    .checked_add(interval)
                    .map_or(true, |next| next > deadline)
            });
            if expired {
                return Err(ChainError::ConfirmationTimeout {
                    tx_hash: tx_hash.to_string(),
                    waited_secs: self.config.confirm_timeout_secs,
                });
            }
            tracing::debug!(tx_hash, "receipt pending");
            tokio::time::sleep(interval).await;
        }
    }
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_quantity(text: &str) -> Result<u128, String> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| format!("quantity {text:?} lacks 0x prefix"))?;
    if digits.is_empty() {
        return Err("empty quantity".into());
    }
    u128::from_str_radix(digits, 16).map_err(|e| format!("invalid quantity {text:?}: {e}"))
}
