use shared_crypto::CryptoError;
use shared_types::{Classified, ErrorKind, Stage};
use thiserror::Error;

/// Review-server session errors. Every variant names the server.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Credentials rejected again after a fresh handshake
    #[error("server {server} rejected the session after re-authentication")]
    AuthExpired {
        /// Server
        server: String,
    },

    /// Transport failure
    #[error("cannot reach server {server}: {message}")]
    Network {
        /// Server
        server: String,
        /// Cause
        message: String,
    },

    /// Non-success status other than an authentication failure
    #[error("server {server} answered {status} to {path}: {body}")]
    Http {
        /// Server
        server: String,
        /// Request path
        path: String,
        /// HTTP status
        status: u16,
        /// Response body
        body: String,
    },

    /// Response shape or server identity not as expected
    #[error("protocol error with server {server}: {message}")]
    Protocol {
        /// Server
        server: String,
        /// What was wrong
        message: String,
    },

    /// Token decryption failed
    #[error("cannot decrypt session tokens from {server}: {source}")]
    Crypto {
        /// Server
        server: String,
        /// Cause
        #[source]
        source: CryptoError,
    },
}

impl Classified for SessionError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthExpired { .. } => ErrorKind::AuthExpiry,
            Self::Network { .. } | Self::Http { .. } => ErrorKind::Network,
            Self::Protocol { .. } => ErrorKind::Protocol,
            Self::Crypto { .. } => ErrorKind::Crypto,
        }
    }

    fn stage(&self) -> Stage {
        match self {
            Self::Crypto { .. } => Stage::Encryption,
            _ => Stage::Network,
        }
    }
}
