//! # Adapters Layer
//!
//! - `http`: reqwest-backed transport
//! - `scripted`: transport answering with a closure
//! - `fake_server`: in-process review server for tests and dry runs

pub mod fake_server;
pub mod http;
pub mod scripted;

pub use fake_server::FakeReviewServer;
pub use http::{ReqwestTransport, TransportConfig};
pub use scripted::ScriptedTransport;
