//! # Ledger Capability Port
//!
//! The narrow surface the core needs from the claim ledger: resolve a name,
//! publish a claim, sign a payload on behalf of a channel, list the local
//! channels. Adapters wrap the real daemon; [`InMemoryLedger`] backs tests.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_crypto::{sha256, signable_digest, Secp256k1KeyPair};
use thiserror::Error;

use crate::errors::{Classified, ErrorKind, Stage};

/// Ledger failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The ledger refused a publish because the name is already claimed.
    #[error("claim {name} is already taken")]
    ClaimTaken {
        /// Claim name
        name: String,
    },

    /// No local channel with this name.
    #[error("channel {channel} not found")]
    ChannelNotFound {
        /// Channel name
        channel: String,
    },

    /// Daemon unreachable.
    #[error("ledger connection failed: {0}")]
    Connection(String),

    /// Daemon reported an error for a call.
    #[error("ledger call {method} failed: {message}")]
    Rpc {
        /// RPC method
        method: String,
        /// Daemon message
        message: String,
    },

    /// Daemon answered with an unexpected shape.
    #[error("unexpected ledger response: {0}")]
    InvalidResponse(String),
}

impl Classified for LedgerError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::ClaimTaken { .. } | Self::ChannelNotFound { .. } => ErrorKind::Validation,
            Self::Connection(_) | Self::Rpc { .. } => ErrorKind::Network,
            Self::InvalidResponse(_) => ErrorKind::Protocol,
        }
    }

    fn stage(&self) -> Stage {
        match self {
            Self::ClaimTaken { .. } | Self::ChannelNotFound { .. } => Stage::Validation,
            _ => Stage::Network,
        }
    }
}

/// A resolved claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedClaim {
    /// Claim name
    pub name: String,
    /// Claim id (hex, ledger display order)
    pub claim_id: String,
    /// Signing channel, for stream claims
    pub channel_name: Option<String>,
    /// Channel public key (DER), for channel claims
    pub public_key: Option<Vec<u8>>,
}

impl ResolvedClaim {
    /// Claim hash in the byte order signatures bind to.
    pub fn claim_hash(&self) -> Result<Vec<u8>, LedgerError> {
        claim_hash_from_id(&self.claim_id)
    }
}

/// Claim ids are the hex of the reversed claim hash.
pub fn claim_hash_from_id(claim_id: &str) -> Result<Vec<u8>, LedgerError> {
    let mut bytes = hex::decode(claim_id)
        .map_err(|_| LedgerError::InvalidResponse(format!("claim id {claim_id} is not hex")))?;
    bytes.reverse();
    Ok(bytes)
}

/// A channel the local wallet controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Channel name, including the leading `@`
    pub name: String,
    /// Channel claim id
    pub claim_id: String,
    /// Public key (DER)
    pub public_key: Vec<u8>,
}

/// A claim to publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    /// Claim name
    pub name: String,
    /// Bid amount
    pub bid: String,
    /// Artifact to upload
    pub file_path: PathBuf,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Author field
    pub author: String,
    /// Tags
    pub tags: Vec<String>,
    /// Publishing channel
    pub channel_name: Option<String>,
}

/// Ledger receipt for a publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    /// Transaction id
    pub txid: String,
    /// New claim id
    pub claim_id: String,
}

/// Signature produced by a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPayload {
    /// 64-byte r||s signature
    pub signature: Vec<u8>,
    /// Timestamp string included in the signed digest
    pub signing_ts: String,
}

/// Capability interface over the external ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Resolve `name`. `Ok(None)` means the name is free.
    async fn resolve(&self, name: &str) -> Result<Option<ResolvedClaim>, LedgerError>;

    /// Publish a claim.
    async fn publish_claim(&self, request: PublishRequest) -> Result<PublishReceipt, LedgerError>;

    /// Sign `payload` with `channel_name`'s key over
    /// `SHA-256(signing_ts || claim_hash || payload)`.
    async fn sign_payload(
        &self,
        channel_name: &str,
        payload: &[u8],
    ) -> Result<SignedPayload, LedgerError>;

    /// Channels the local wallet controls.
    async fn list_channels(&self) -> Result<Vec<ChannelInfo>, LedgerError>;

    /// Convenience: is `name` unclaimed?
    async fn is_claim_free(&self, name: &str) -> Result<bool, LedgerError> {
        Ok(self.resolve(name).await?.is_none())
    }

    /// Convenience: find a local channel by name.
    async fn find_channel(&self, name: &str) -> Result<ChannelInfo, LedgerError> {
        self.list_channels()
            .await?
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| LedgerError::ChannelNotFound {
                channel: name.to_string(),
            })
    }
}

// =============================================================================
// IN-MEMORY ADAPTER
// =============================================================================

struct Channel {
    claim_id: String,
    keypair: Secp256k1KeyPair,
}

/// A claim held by [`InMemoryLedger`].
#[derive(Debug, Clone)]
pub struct StoredClaim {
    /// Original publish request
    pub request: PublishRequest,
    /// Receipt handed out
    pub receipt: PublishReceipt,
    /// Artifact bytes read at publish time
    pub content: Vec<u8>,
}

#[derive(Default)]
struct LedgerState {
    channels: HashMap<String, Channel>,
    claims: HashMap<String, StoredClaim>,
    tx_counter: u64,
    fail_next_publish: Option<LedgerError>,
    fixed_signing_ts: Option<String>,
}

/// In-memory ledger for tests and offline runs.
///
/// Duplicate publishes are rejected with `LedgerError::ClaimTaken`, so the
/// ledger arbitrates even when local checks were skipped.
#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a channel with a fresh key pair.
    pub fn create_channel(&self, name: &str) -> ChannelInfo {
        self.insert_channel(name, Secp256k1KeyPair::generate())
    }

    /// Create a channel with a known key pair.
    pub fn insert_channel(&self, name: &str, keypair: Secp256k1KeyPair) -> ChannelInfo {
        let claim_id = hex::encode(&sha256(name.as_bytes())[..20]);
        // DER encoding of a valid key cannot fail
        let public_key = keypair.public_key().to_der().unwrap_or_default();

        self.state.lock().channels.insert(
            name.to_string(),
            Channel {
                claim_id: claim_id.clone(),
                keypair,
            },
        );

        ChannelInfo {
            name: name.to_string(),
            claim_id,
            public_key,
        }
    }

    /// Make the next publish fail with `error`.
    pub fn fail_next_publish(&self, error: LedgerError) {
        self.state.lock().fail_next_publish = Some(error);
    }

    /// Pin the timestamp used by `sign_payload`.
    pub fn set_signing_ts(&self, ts: impl Into<String>) {
        self.state.lock().fixed_signing_ts = Some(ts.into());
    }

    /// Look up a published claim.
    pub fn claim(&self, name: &str) -> Option<StoredClaim> {
        self.state.lock().claims.get(name).cloned()
    }

    /// Number of published claims.
    pub fn claim_count(&self) -> usize {
        self.state.lock().claims.len()
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn resolve(&self, name: &str) -> Result<Option<ResolvedClaim>, LedgerError> {
        let state = self.state.lock();

        if let Some(channel) = state.channels.get(name) {
            let der = channel
                .keypair
                .public_key()
                .to_der()
                .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;
            return Ok(Some(ResolvedClaim {
                name: name.to_string(),
                claim_id: channel.claim_id.clone(),
                channel_name: None,
                public_key: Some(der),
            }));
        }

        Ok(state.claims.get(name).map(|stored| ResolvedClaim {
            name: name.to_string(),
            claim_id: stored.receipt.claim_id.clone(),
            channel_name: stored.request.channel_name.clone(),
            public_key: None,
        }))
    }

    async fn publish_claim(&self, request: PublishRequest) -> Result<PublishReceipt, LedgerError> {
        let mut state = self.state.lock();

        if let Some(error) = state.fail_next_publish.take() {
            return Err(error);
        }

        if state.claims.contains_key(&request.name) || state.channels.contains_key(&request.name) {
            return Err(LedgerError::ClaimTaken {
                name: request.name.clone(),
            });
        }

        if let Some(channel) = &request.channel_name {
            if !state.channels.contains_key(channel) {
                return Err(LedgerError::ChannelNotFound {
                    channel: channel.clone(),
                });
            }
        }

        let content = std::fs::read(&request.file_path).map_err(|e| LedgerError::Rpc {
            method: "stream_create".to_string(),
            message: format!("cannot read {}: {e}", request.file_path.display()),
        })?;

        state.tx_counter += 1;
        let txid = format!("{:064x}", state.tx_counter);
        let claim_id = hex::encode(&sha256(format!("{}{txid}", request.name).as_bytes())[..20]);
        let receipt = PublishReceipt { txid, claim_id };

        state.claims.insert(
            request.name.clone(),
            StoredClaim {
                request,
                receipt: receipt.clone(),
                content,
            },
        );

        Ok(receipt)
    }

    async fn sign_payload(
        &self,
        channel_name: &str,
        payload: &[u8],
    ) -> Result<SignedPayload, LedgerError> {
        let state = self.state.lock();
        let channel = state
            .channels
            .get(channel_name)
            .ok_or_else(|| LedgerError::ChannelNotFound {
                channel: channel_name.to_string(),
            })?;

        let signing_ts = state
            .fixed_signing_ts
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().timestamp().to_string());
        let claim_hash = claim_hash_from_id(&channel.claim_id)?;
        let digest = signable_digest(&signing_ts, &claim_hash, payload);

        let signature = channel
            .keypair
            .sign_prehash(&digest)
            .map_err(|e| LedgerError::Rpc {
                method: "channel_sign".to_string(),
                message: e.to_string(),
            })?;

        Ok(SignedPayload {
            signature: signature.as_bytes().to_vec(),
            signing_ts,
        })
    }

    async fn list_channels(&self) -> Result<Vec<ChannelInfo>, LedgerError> {
        let state = self.state.lock();
        state
            .channels
            .iter()
            .map(|(name, channel)| {
                Ok(ChannelInfo {
                    name: name.clone(),
                    claim_id: channel.claim_id.clone(),
                    public_key: channel
                        .keypair
                        .public_key()
                        .to_der()
                        .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?,
                })
            })
            .collect()
    }
}
