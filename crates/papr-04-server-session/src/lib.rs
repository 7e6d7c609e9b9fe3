//! # Server Session Subsystem (PAPR-04)
//!
//! Authenticated sessions with remote review servers and a typed client for
//! their API.
//!
//! ## Session Lifecycle
//!
//! | From | Event | To |
//! |------|-------|----|
//! | `NoSession` | handshake | `TokenObtained` |
//! | `TokenObtained` | 401, re-handshake | `TokenObtained` |
//! | `TokenObtained` | 401 after re-handshake | `Failed` |
//!
//! Refreshes are serialized: a request that hits 401 while another request
//! is already refreshing waits and reuses the new token.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FakeReviewServer, ReqwestTransport, ScriptedTransport, TransportConfig};
pub use domain::errors::SessionError;
pub use domain::state::{SessionState, SessionTokens};
pub use ports::outbound::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
pub use service::{ReviewServerClient, SessionManager};
