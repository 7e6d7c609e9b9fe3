//! Typed review-server API over a [`SessionManager`].
//!
//! | Call | Route | Success |
//! |------|-------|---------|
//! | `register` | `POST /api/register/` | 201 |
//! | `submit` | `POST /api/submit/` | 2xx |
//! | `accept` | `POST /api/accept` | 200 |
//! | `recommend` | `POST /api/recommend` | 2xx |
//! | `status` | `GET /api/status/{base}` | 2xx |

use serde::Serialize;
use serde_json::Value;
use shared_types::wire::{
    AcceptRequest, RecommendRequest, RegisterRequest, RegisterResponse, SubmitRequest,
};
use tracing::info;

use super::session::SessionManager;
use crate::domain::errors::SessionError;
use crate::ports::outbound::{HttpMethod, HttpResponse, HttpTransport};

/// Client for one review server, acting as one channel.
pub struct ReviewServerClient<T: HttpTransport + ?Sized> {
    session: SessionManager<T>,
}

impl<T: HttpTransport + ?Sized> ReviewServerClient<T> {
    pub fn new(session: SessionManager<T>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionManager<T> {
        &self.session
    }

    /// Register `channel_name` with the server. Needs no session.
    pub async fn register(&self, channel_name: &str) -> Result<RegisterResponse, SessionError> {
        let path = "/api/register/";
        let body = self.to_json(&RegisterRequest {
            channel_name: channel_name.to_string(),
        })?;
        let response = self
            .session
            .send_public(HttpMethod::Post, path, Some(body))
            .await?;
        let response = self.expect(path, response, Some(201))?;

        info!(server = %self.session.server_name(), channel = channel_name, "registered with review server");
        serde_json::from_value(response.body).map_err(|e| self.protocol(e.to_string()))
    }

    /// Announce a published revision.
    pub async fn submit(&self, request: &SubmitRequest) -> Result<Value, SessionError> {
        self.post("/api/submit/", request, None).await
    }

    /// Hand over the article secrets on acceptance.
    pub async fn accept(&self, request: &AcceptRequest) -> Result<(), SessionError> {
        self.post("/api/accept", request, Some(200)).await.map(|_| ())
    }

    /// Recommend a reviewer for a submission.
    pub async fn recommend(&self, request: &RecommendRequest) -> Result<Value, SessionError> {
        self.post("/api/recommend", request, None).await
    }

    /// Server-defined status of an article.
    pub async fn status(&self, base_claim_name: &str) -> Result<Value, SessionError> {
        let path = format!("/api/status/{base_claim_name}");
        let response = self.session.send(HttpMethod::Get, &path, None).await?;
        Ok(self.expect(&path, response, None)?.body)
    }

    async fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        expected: Option<u16>,
    ) -> Result<Value, SessionError> {
        let body = self.to_json(body)?;
        let response = self.session.send(HttpMethod::Post, path, Some(body)).await?;
        Ok(self.expect(path, response, expected)?.body)
    }

    /// `expected` is an exact status; `None` accepts any 2xx.
    fn expect(
        &self,
        path: &str,
        response: HttpResponse,
        expected: Option<u16>,
    ) -> Result<HttpResponse, SessionError> {
        let ok = match expected {
            Some(status) => response.status == status,
            None => response.is_success(),
        };
        if ok {
            return Ok(response);
        }
        Err(SessionError::Http {
            server: self.session.server_name().to_string(),
            path: path.to_string(),
            status: response.status,
            body: response.body.to_string(),
        })
    }

    fn to_json<B: Serialize>(&self, body: &B) -> Result<Value, SessionError> {
        serde_json::to_value(body).map_err(|e| self.protocol(e.to_string()))
    }

    fn protocol(&self, message: String) -> SessionError {
        SessionError::Protocol {
            server: self.session.server_name().to_string(),
            message,
        }
    }
}
