//! # Signature Errors

use shared_types::{Classified, ErrorKind, LedgerError, Stage};
use thiserror::Error;

/// Errors from review signing and verification.
///
/// A signature that simply does not verify is not an error; `verify`
/// returns `Ok(false)` for it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Artifact has no signature block
    #[error("Review artifact has no signature block")]
    MissingDelimiter,

    /// Signature block is not 64 bytes of hex
    #[error("Malformed review signature: {0}")]
    MalformedSignature(String),

    /// Signing timestamp is not a number
    #[error("Unparsable signing timestamp: {0:?}")]
    MalformedTimestamp(String),

    /// Claimed reviewer channel does not resolve
    #[error("Reviewer identity {channel} not found")]
    IdentityNotFound {
        /// Claimed channel
        channel: String,
    },

    /// Resolved claim carries no usable public key
    #[error("Reviewer identity {channel} has no usable public key")]
    InvalidIdentityKey {
        /// Claimed channel
        channel: String,
    },

    /// Ledger call failed
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl Classified for SignatureError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingDelimiter | Self::MalformedSignature(_) | Self::MalformedTimestamp(_) => {
                ErrorKind::Crypto
            }
            Self::IdentityNotFound { .. } | Self::InvalidIdentityKey { .. } => ErrorKind::Protocol,
            Self::Ledger(e) => e.kind(),
        }
    }

    fn stage(&self) -> Stage {
        match self {
            Self::MissingDelimiter | Self::MalformedSignature(_) | Self::MalformedTimestamp(_) => {
                Stage::Validation
            }
            Self::IdentityNotFound { .. } | Self::InvalidIdentityKey { .. } => Stage::Network,
            Self::Ledger(e) => e.stage(),
        }
    }
}
