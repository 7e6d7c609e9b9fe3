//! # Error Taxonomy
//!
//! Every subsystem error maps onto one [`ErrorKind`] (how the caller should
//! react) and one [`Stage`] (where in the operation it failed).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error classes shared across subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input or state: duplicate names, missing files, unknown references.
    /// Never retried, nothing mutated.
    Validation,
    /// Bad passphrase, malformed signature payload, missing key material.
    Crypto,
    /// Connection failure or unexpected non-2xx response.
    Network,
    /// Credentials rejected by a remote server.
    AuthExpiry,
    /// Remote party answered with something unusable.
    Protocol,
    /// Local store failed.
    Persistence,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "ValidationError",
            Self::Crypto => "CryptoError",
            Self::Network => "NetworkError",
            Self::AuthExpiry => "AuthExpiryError",
            Self::Protocol => "ProtocolError",
            Self::Persistence => "PersistenceError",
        };
        f.write_str(s)
    }
}

/// Operation stage an error surfaced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Input and state checks before any side effect.
    Validation,
    /// Key handling, encryption, signing.
    Encryption,
    /// Ledger or review-server traffic.
    Network,
    /// Local store writes.
    Persistence,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::Encryption => "encryption",
            Self::Network => "network",
            Self::Persistence => "persistence",
        };
        f.write_str(s)
    }
}

/// Implemented by every subsystem error enum.
pub trait Classified: std::error::Error {
    /// Error class.
    fn kind(&self) -> ErrorKind;

    /// Stage the error surfaced in.
    fn stage(&self) -> Stage;
}
