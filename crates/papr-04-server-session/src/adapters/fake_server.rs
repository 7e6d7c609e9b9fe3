//! In-process review server speaking the token handshake.
//!
//! Knows its clients' channel keys up front, issues `access-{n}` tokens and
//! can be told to reject upcoming authenticated calls.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::Mutex;
use serde_json::{json, Value};
use shared_crypto::passphrase::encrypt_with_cost;
use shared_crypto::{ScryptCost, Secp256k1KeyPair, Secp256k1PublicKey};

use crate::ports::outbound::{HttpRequest, HttpResponse, HttpTransport, TransportError};

const TOKEN_ROUTE: &str = "/api/token/";
const REGISTER_ROUTE: &str = "/api/register/";

/// A review server living in the test process.
pub struct FakeReviewServer {
    name: String,
    channel_name: String,
    keypair: Secp256k1KeyPair,
    cost: ScryptCost,
    clients: Mutex<HashMap<String, Secp256k1PublicKey>>,
    valid_tokens: Mutex<HashSet<String>>,
    issued: AtomicU64,
    reject_next: AtomicUsize,
    overrides: Mutex<HashMap<String, u16>>,
    received: Mutex<Vec<(String, Value)>>,
}

impl FakeReviewServer {
    pub fn new(name: &str, channel_name: &str, cost: ScryptCost) -> Self {
        Self {
            name: name.to_string(),
            channel_name: channel_name.to_string(),
            keypair: Secp256k1KeyPair::generate(),
            cost,
            clients: Mutex::new(HashMap::new()),
            valid_tokens: Mutex::new(HashSet::new()),
            issued: AtomicU64::new(0),
            reject_next: AtomicUsize::new(0),
            overrides: Mutex::new(HashMap::new()),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Base64 compressed server key, as published.
    pub fn public_key(&self) -> String {
        STANDARD.encode(self.keypair.public_key().to_compressed())
    }

    /// Allow `channel` to handshake with `key`.
    pub fn add_client(&self, channel: &str, key: Secp256k1PublicKey) {
        self.clients.lock().insert(channel.to_string(), key);
    }

    /// Invalidate every token issued so far.
    pub fn expire_tokens(&self) {
        self.valid_tokens.lock().clear();
    }

    /// Answer the next `n` authenticated calls with 401.
    pub fn reject_next(&self, n: usize) {
        self.reject_next.store(n, Ordering::SeqCst);
    }

    /// Answer every call to `path` with `status`.
    pub fn respond_with(&self, path: &str, status: u16) {
        self.overrides.lock().insert(path.to_string(), status);
    }

    /// Tokens issued so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Bodies received on `path`, in order.
    pub fn received(&self, path: &str) -> Vec<Value> {
        self.received
            .lock()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }

    fn respond(status: u16, body: Value) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse { status, body })
    }

    fn issue_tokens(&self, channel: &str) -> Result<HttpResponse, TransportError> {
        let Some(client) = self.clients.lock().get(channel).copied() else {
            return Self::respond(404, json!({"detail": "unknown channel"}));
        };

        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let access = format!("access-{n}");
        let refresh = format!("refresh-{n}");
        let shared = self.keypair.shared_secret(&client);
        let seal = |token: &str| {
            encrypt_with_cost(&shared[..], token.as_bytes(), self.cost)
                .map_err(|e| TransportError(e.to_string()))
        };
        let body = json!({
            "pub_key": self.public_key(),
            "access": seal(&access)?,
            "refresh": seal(&refresh)?,
        });

        self.valid_tokens.lock().insert(access);
        Self::respond(200, body)
    }

    fn authorized(&self, request: &HttpRequest) -> bool {
        let known = request
            .bearer
            .as_ref()
            .is_some_and(|t| self.valid_tokens.lock().contains(t));
        let rejected = self
            .reject_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        known && !rejected
    }

    /// Route one request.
    pub fn handle(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let path = request
            .url
            .find("/api/")
            .map_or(request.url.as_str(), |i| &request.url[i..])
            .to_string();

        if let Some(channel) = path.strip_prefix(TOKEN_ROUTE) {
            return self.issue_tokens(channel);
        }

        let body = request.body.clone().unwrap_or(Value::Null);
        if path != REGISTER_ROUTE && !self.authorized(request) {
            return Self::respond(401, json!({"detail": "Given token not valid for any token type"}));
        }
        self.received.lock().push((path.clone(), body));

        if let Some(status) = self.overrides.lock().get(&path).copied() {
            return Self::respond(status, json!({"detail": "scripted"}));
        }

        if path == REGISTER_ROUTE {
            return Self::respond(
                201,
                json!({"name": self.name, "channel_name": self.channel_name, "created": true}),
            );
        }
        if let Some(base) = path.strip_prefix("/api/status/") {
            return Self::respond(200, json!({"article": base, "state": "under review"}));
        }
        Self::respond(200, json!({"ok": true}))
    }
}

#[async_trait]
impl HttpTransport for FakeReviewServer {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        tokio::task::yield_now().await;
        self.handle(&request)
    }
}
