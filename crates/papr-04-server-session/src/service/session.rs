//! # Session Manager
//!
//! Handshake: `GET /api/token/{channel}` returns the server key and two
//! tokens, each a passphrase envelope keyed by the ECDH shared secret of the
//! caller's channel key and the server key.
//!
//! Every authenticated call gets two attempts. A 401 on the first triggers
//! one re-handshake; a 401 on the second is terminal.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::RwLock;
use serde_json::Value;
use shared_crypto::{passphrase, CryptoError, Secp256k1KeyPair, Secp256k1PublicKey};
use shared_types::wire::TokenResponse;
use shared_types::Server;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::domain::errors::SessionError;
use crate::domain::state::{SessionState, SessionTokens};
use crate::ports::outbound::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};

const UNAUTHORIZED: u16 = 401;

/// Session of one caller channel with one review server.
pub struct SessionManager<T: HttpTransport + ?Sized> {
    transport: Arc<T>,
    server_name: String,
    base_url: String,
    channel_name: String,
    keypair: Secp256k1KeyPair,
    server_key: RwLock<Option<Secp256k1PublicKey>>,
    state: RwLock<SessionState>,
    refresh: tokio::sync::Mutex<()>,
    handshakes: AtomicU64,
}

impl<T: HttpTransport + ?Sized> SessionManager<T> {
    /// Session for `channel_name` (signing with `keypair`) against `server`.
    ///
    /// # Errors
    ///
    /// `Protocol` if the server's stored public key does not decode.
    pub fn new(
        transport: Arc<T>,
        server: &Server,
        channel_name: impl Into<String>,
        keypair: Secp256k1KeyPair,
    ) -> Result<Self, SessionError> {
        let server_key = server
            .public_key
            .as_deref()
            .map(|encoded| decode_server_key(&server.name, encoded))
            .transpose()?;

        Ok(Self {
            transport,
            server_name: server.name.clone(),
            base_url: server.url.trim_end_matches('/').to_string(),
            channel_name: channel_name.into(),
            keypair,
            server_key: RwLock::new(server_key),
            state: RwLock::new(SessionState::NoSession),
            refresh: tokio::sync::Mutex::new(()),
            handshakes: AtomicU64::new(0),
        })
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Absolute URL of `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Handshakes performed so far.
    pub fn handshake_count(&self) -> u64 {
        self.handshakes.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Base64 compressed server key, once known.
    pub fn server_public_key(&self) -> Option<String> {
        self.server_key
            .read()
            .map(|key| STANDARD.encode(key.to_compressed()))
    }

    /// Make sure a token is held, handshaking if needed.
    pub async fn connect(&self) -> Result<(), SessionError> {
        self.current_token().await.map(|_| ())
    }

    /// Unauthenticated call.
    pub async fn send_public(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<HttpResponse, SessionError> {
        self.send_once(method, path, body, None).await
    }

    /// Authenticated call with one re-handshake on 401.
    pub async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<HttpResponse, SessionError> {
        let (token, generation) = self.current_token().await?;
        let response = self
            .send_once(method, path, body.clone(), Some(token))
            .await?;
        if response.status != UNAUTHORIZED {
            return Ok(response);
        }

        warn!(server = %self.server_name, path, "access token rejected, re-authenticating");
        let token = self.refresh_after(generation).await?;
        let response = self.send_once(method, path, body, Some(token)).await?;
        if response.status != UNAUTHORIZED {
            return Ok(response);
        }

        *self.state.write() = SessionState::Failed;
        warn!(server = %self.server_name, path, "session rejected after re-authentication");
        Err(SessionError::AuthExpired {
            server: self.server_name.clone(),
        })
    }

    async fn send_once(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        bearer: Option<Zeroizing<String>>,
    ) -> Result<HttpResponse, SessionError> {
        let request = HttpRequest {
            method,
            url: self.url(path),
            bearer: bearer.map(|t| t.as_str().to_owned()),
            body,
        };
        debug!(server = %self.server_name, path, "sending request");

        self.transport
            .send(request)
            .await
            .map_err(|e| SessionError::Network {
                server: self.server_name.clone(),
                message: e.0,
            })
    }

    async fn current_token(&self) -> Result<(Zeroizing<String>, u64), SessionError> {
        if let Some(token) = self.state.read().token() {
            return Ok(token);
        }

        let _refresh = self.refresh.lock().await;
        if let Some(token) = self.state.read().token() {
            return Ok(token);
        }
        self.handshake().await
    }

    /// Replace the token of `stale_generation`, unless someone already did.
    async fn refresh_after(&self, stale_generation: u64) -> Result<Zeroizing<String>, SessionError> {
        let _refresh = self.refresh.lock().await;
        if let Some((token, generation)) = self.state.read().token() {
            if generation != stale_generation {
                debug!(server = %self.server_name, "reusing token refreshed concurrently");
                return Ok(token);
            }
        }

        *self.state.write() = SessionState::NoSession;
        self.handshake().await.map(|(token, _)| token)
    }

    /// Run the handshake. Callers hold the refresh lock.
    async fn handshake(&self) -> Result<(Zeroizing<String>, u64), SessionError> {
        let path = format!("/api/token/{}", self.channel_name);
        let response = self.send_once(HttpMethod::Get, &path, None, None).await?;
        if !response.is_success() {
            return Err(SessionError::Http {
                server: self.server_name.clone(),
                path,
                status: response.status,
                body: response.body.to_string(),
            });
        }

        let offered: TokenResponse =
            serde_json::from_value(response.body).map_err(|e| self.protocol(e.to_string()))?;
        let server_key = self.check_server_key(&offered.pub_key)?;
        let shared = self.keypair.shared_secret(&server_key);

        let (access, refresh) = tokio::task::spawn_blocking(move || {
            let open = |envelope: &str| -> Result<Zeroizing<String>, CryptoError> {
                let bytes = Zeroizing::new(passphrase::decrypt(&shared[..], envelope)?);
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;
                Ok(Zeroizing::new(text.to_string()))
            };
            Ok::<_, CryptoError>((open(&offered.access)?, open(&offered.refresh)?))
        })
        .await
        .map_err(|e| self.protocol(e.to_string()))?
        .map_err(|source| SessionError::Crypto {
            server: self.server_name.clone(),
            source,
        })?;

        let generation = self.handshakes.fetch_add(1, Ordering::SeqCst) + 1;
        *self.state.write() = SessionState::TokenObtained {
            tokens: SessionTokens {
                access: access.clone(),
                refresh,
            },
            generation,
        };
        info!(server = %self.server_name, channel = %self.channel_name, "session established");

        Ok((access, generation))
    }

    /// Learn the server key on first contact; afterwards it must not change.
    fn check_server_key(&self, offered: &str) -> Result<Secp256k1PublicKey, SessionError> {
        let offered = decode_server_key(&self.server_name, offered)?;
        let mut known = self.server_key.write();
        if let Some(key) = *known {
            if key != offered {
                return Err(self.protocol(
                    "token response was encrypted by a different server key".to_string(),
                ));
            }
            return Ok(key);
        }

        info!(server = %self.server_name, "learned server public key");
        *known = Some(offered);
        Ok(offered)
    }

    fn protocol(&self, message: String) -> SessionError {
        SessionError::Protocol {
            server: self.server_name.clone(),
            message,
        }
    }
}

fn decode_server_key(server: &str, encoded: &str) -> Result<Secp256k1PublicKey, SessionError> {
    let protocol = |message: String| SessionError::Protocol {
        server: server.to_string(),
        message,
    };
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| protocol(format!("server key is not base64: {e}")))?;
    Secp256k1PublicKey::from_sec1(&bytes).map_err(|e| protocol(format!("bad server key: {e}")))
}
