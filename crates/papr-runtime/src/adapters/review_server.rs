//! [`ReviewServerGateway`] over authenticated review-server sessions.
//!
//! One [`ReviewServerClient`] is kept per (server, channel) pair so tokens
//! survive across commands of one process.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use papr_02_article_revisions::{GatewayError, ReviewServerGateway};
use papr_04_server_session::{HttpTransport, ReviewServerClient, SessionManager};
use parking_lot::Mutex;
use serde_json::Value;
use shared_types::wire::{AcceptRequest, RecommendRequest, RegisterResponse, SubmitRequest};
use shared_types::{Classified, Server};
use tracing::debug;

use crate::error::CommandError;
use crate::ports::ChannelKeys;

type ClientKey = (String, String);

/// Session-backed review-server gateway.
pub struct SessionGateway<T: HttpTransport + ?Sized> {
    transport: Arc<T>,
    keys: Arc<dyn ChannelKeys>,
    clients: Mutex<HashMap<ClientKey, Arc<ReviewServerClient<T>>>>,
}

impl<T: HttpTransport + ?Sized> SessionGateway<T> {
    pub fn new(transport: Arc<T>, keys: Arc<dyn ChannelKeys>) -> Self {
        Self {
            transport,
            keys,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Client acting as `channel_name` toward `server`, created on first use.
    pub async fn client(
        &self,
        server: &Server,
        channel_name: &str,
    ) -> Result<Arc<ReviewServerClient<T>>, CommandError> {
        let key = (server.name.clone(), channel_name.to_string());
        if let Some(client) = self.clients.lock().get(&key) {
            return Ok(client.clone());
        }

        let keypair = self.keys.channel_keypair(channel_name).await?;
        let session = SessionManager::new(self.transport.clone(), server, channel_name, keypair)?;
        debug!(server = %server.name, channel = channel_name, "opened review server client");

        let client = Arc::new(ReviewServerClient::new(session));
        Ok(self.clients.lock().entry(key).or_insert(client).clone())
    }

    /// Register `channel_name` with the server at `url`.
    pub async fn register(
        &self,
        url: &str,
        channel_name: &str,
    ) -> Result<RegisterResponse, CommandError> {
        let provisional = Server {
            name: url.to_string(),
            channel_name: String::new(),
            url: url.to_string(),
            public_key: None,
        };
        let keypair = self.keys.channel_keypair(channel_name).await?;
        let session =
            SessionManager::new(self.transport.clone(), &provisional, channel_name, keypair)?;
        Ok(ReviewServerClient::new(session).register(channel_name).await?)
    }

    /// Server-defined status of an article, asked as `channel_name`.
    pub async fn status(
        &self,
        server: &Server,
        channel_name: &str,
        base_claim_name: &str,
    ) -> Result<Value, CommandError> {
        let client = self.client(server, channel_name).await?;
        Ok(client.status(base_claim_name).await?)
    }

    /// Suggest a reviewer for a submission, as `request.recommender_channel`.
    pub async fn recommend(
        &self,
        server: &Server,
        request: &RecommendRequest,
    ) -> Result<Value, CommandError> {
        let client = self.client(server, &request.recommender_channel).await?;
        Ok(client.recommend(request).await?)
    }

    /// Public key of `server_name` learned by any open session.
    pub fn learned_key(&self, server_name: &str) -> Option<String> {
        self.clients
            .lock()
            .iter()
            .filter(|((server, _), _)| server == server_name)
            .find_map(|(_, client)| client.session().server_public_key())
    }
}

fn gateway_error(error: CommandError) -> GatewayError {
    GatewayError {
        kind: error.kind(),
        message: error.to_string(),
    }
}

#[async_trait]
impl<T: HttpTransport + ?Sized> ReviewServerGateway for SessionGateway<T> {
    async fn submit(&self, server: &Server, request: SubmitRequest) -> Result<(), GatewayError> {
        let client = self
            .client(server, &request.corresponding_author)
            .await
            .map_err(gateway_error)?;
        client
            .submit(&request)
            .await
            .map(|_| ())
            .map_err(|e| gateway_error(e.into()))
    }

    async fn accept(&self, server: &Server, request: AcceptRequest) -> Result<(), GatewayError> {
        let client = self
            .client(server, &request.channel_name)
            .await
            .map_err(gateway_error)?;
        client
            .accept(&request)
            .await
            .map_err(|e| gateway_error(e.into()))
    }
}
