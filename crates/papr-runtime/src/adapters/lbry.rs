//! LBRY wallet daemon adapter for [`LedgerClient`] and [`ChannelKeys`].
//!
//! | Port call | Daemon method |
//! |-----------|---------------|
//! | `resolve` | `resolve` |
//! | `publish_claim` | `stream_create` (blocking) |
//! | `sign_payload` | `channel_sign` |
//! | `list_channels` | `channel_list` |
//! | `channel_keypair` | `channel_export` |

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{
    ChannelInfo, LedgerClient, LedgerError, PublishReceipt, PublishRequest, ResolvedClaim,
    SignedPayload,
};
use tracing::{debug, info};

use crate::ports::ChannelKeys;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    #[serde(default)]
    code: i64,
    message: String,
}

/// JSON-RPC client for the wallet daemon.
pub struct LbryDaemonClient {
    client: Client,
    url: String,
    request_id: AtomicU64,
}

impl LbryDaemonClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LedgerError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| LedgerError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            request_id: AtomicU64::new(1),
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.request_id.fetch_add(1, Ordering::Relaxed),
        };
        debug!(method, "ledger call");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LedgerError::Connection(format!("cannot connect to {}", self.url))
                } else {
                    LedgerError::Connection(e.to_string())
                }
            })?;

        let response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::InvalidResponse(format!("{method}: {e}")))?;

        if let Some(error) = response.error {
            return Err(rpc_error(method, error.code, &error.message));
        }
        response
            .result
            .ok_or_else(|| LedgerError::InvalidResponse(format!("{method}: missing result")))
    }
}

#[async_trait]
impl LedgerClient for LbryDaemonClient {
    async fn resolve(&self, name: &str) -> Result<Option<ResolvedClaim>, LedgerError> {
        let result = self.call("resolve", json!({ "urls": [name] })).await?;
        parse_resolve(name, &result)
    }

    async fn publish_claim(&self, request: PublishRequest) -> Result<PublishReceipt, LedgerError> {
        let mut params = json!({
            "name": request.name,
            "bid": request.bid,
            "file_path": request.file_path,
            "title": request.title,
            "description": request.description,
            "author": request.author,
            "tags": request.tags,
            "blocking": true,
        });
        if let Some(channel) = &request.channel_name {
            params["channel_name"] = json!(channel);
        }

        let result = self.call("stream_create", params).await?;
        let receipt = parse_publish(&result)?;
        info!(claim_name = %request.name, txid = %receipt.txid, "claim published");
        Ok(receipt)
    }

    async fn sign_payload(
        &self,
        channel_name: &str,
        payload: &[u8],
    ) -> Result<SignedPayload, LedgerError> {
        let result = self
            .call(
                "channel_sign",
                json!({ "channel_name": channel_name, "hexdata": hex::encode(payload) }),
            )
            .await?;
        parse_signature(&result)
    }

    async fn list_channels(&self) -> Result<Vec<ChannelInfo>, LedgerError> {
        let result = self
            .call("channel_list", json!({ "page_size": 100 }))
            .await?;
        parse_channels(&result)
    }
}

#[async_trait]
impl ChannelKeys for LbryDaemonClient {
    async fn channel_keypair(&self, channel_name: &str) -> Result<Secp256k1KeyPair, LedgerError> {
        let result = self
            .call("channel_export", json!({ "channel_name": channel_name }))
            .await?;
        parse_export(channel_name, &result)
    }
}

fn rpc_error(method: &str, code: i64, message: &str) -> LedgerError {
    let lowered = message.to_lowercase();
    if lowered.contains("already have a stream claim") || lowered.contains("already exists") {
        if let Some(name) = quoted(message) {
            return LedgerError::ClaimTaken { name };
        }
    }
    if lowered.contains("couldn't find channel") || lowered.contains("channel not found") {
        if let Some(channel) = quoted(message) {
            return LedgerError::ChannelNotFound { channel };
        }
    }
    LedgerError::Rpc {
        method: method.to_string(),
        message: format!("{message} (code {code})"),
    }
}

/// Last single-quoted token of a daemon message. Names come last, after
/// prose that may contain apostrophes.
fn quoted(message: &str) -> Option<String> {
    let end = message.rfind('\'')?;
    let start = message[..end].rfind('\'')? + 1;
    Some(message[start..end].to_string())
}

fn invalid(what: &str) -> LedgerError {
    LedgerError::InvalidResponse(what.to_string())
}

fn str_field<'a>(value: &'a Value, field: &str, context: &str) -> Result<&'a str, LedgerError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(&format!("{context}: missing {field}")))
}

pub(crate) fn parse_resolve(name: &str, result: &Value) -> Result<Option<ResolvedClaim>, LedgerError> {
    let Some(entry) = result.get(name).or_else(|| {
        result
            .as_object()
            .and_then(|entries| entries.values().next())
    }) else {
        return Ok(None);
    };

    if entry.get("error").is_some() {
        return Ok(None);
    }

    let claim_id = str_field(entry, "claim_id", "resolve")?.to_string();
    let channel_name = entry
        .get("signing_channel")
        .and_then(|c| c.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let public_key = match entry.pointer("/value/public_key").and_then(Value::as_str) {
        Some(key) => Some(
            hex::decode(key).map_err(|_| invalid("resolve: channel public key is not hex"))?,
        ),
        None => None,
    };

    Ok(Some(ResolvedClaim {
        name: entry
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(name)
            .to_string(),
        claim_id,
        channel_name,
        public_key,
    }))
}

pub(crate) fn parse_publish(result: &Value) -> Result<PublishReceipt, LedgerError> {
    let txid = str_field(result, "txid", "stream_create")?.to_string();
    let claim_id = result
        .get("outputs")
        .and_then(Value::as_array)
        .and_then(|outputs| outputs.iter().find_map(|o| o.get("claim_id")))
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("stream_create: no claim output"))?
        .to_string();
    Ok(PublishReceipt { txid, claim_id })
}

pub(crate) fn parse_signature(result: &Value) -> Result<SignedPayload, LedgerError> {
    let signature = hex::decode(str_field(result, "signature", "channel_sign")?)
        .map_err(|_| invalid("channel_sign: signature is not hex"))?;
    let signing_ts = str_field(result, "signing_ts", "channel_sign")?.to_string();
    Ok(SignedPayload {
        signature,
        signing_ts,
    })
}

pub(crate) fn parse_channels(result: &Value) -> Result<Vec<ChannelInfo>, LedgerError> {
    let items = result
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("channel_list: missing items"))?;

    items
        .iter()
        .map(|item| {
            let key = item
                .pointer("/value/public_key")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid("channel_list: missing public key"))?;
            Ok(ChannelInfo {
                name: str_field(item, "name", "channel_list")?.to_string(),
                claim_id: str_field(item, "claim_id", "channel_list")?.to_string(),
                public_key: hex::decode(key)
                    .map_err(|_| invalid("channel_list: public key is not hex"))?,
            })
        })
        .collect()
}

pub(crate) fn parse_export(channel_name: &str, result: &Value) -> Result<Secp256k1KeyPair, LedgerError> {
    let encoded = result
        .as_str()
        .ok_or_else(|| invalid("channel_export: result is not a string"))?;
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| invalid("channel_export: result is not base64"))?;
    let exported: Value = serde_json::from_slice(&bytes)
        .map_err(|_| invalid("channel_export: result is not JSON"))?;

    let pem = str_field(&exported, "signing_private_key", "channel_export")?;
    Secp256k1KeyPair::from_pem(pem).map_err(|_| {
        invalid(&format!("channel_export: unusable private key for {channel_name}"))
    })
}
