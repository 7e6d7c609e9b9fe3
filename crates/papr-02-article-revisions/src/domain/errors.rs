//! # Domain Errors
//!
//! Every variant names the article, claim or server it concerns.

use std::path::PathBuf;

use shared_crypto::CryptoError;
use shared_types::{ClaimNameError, Classified, ErrorKind, LedgerError, Stage};
use thiserror::Error;

use crate::ports::outbound::GatewayError;

/// Key-value store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError {
        /// Underlying error
        message: String,
    },
    /// Stored bytes could not be decoded.
    #[error("KV store corruption: {message}")]
    CorruptionError {
        /// What was wrong
        message: String,
    },
}

/// Errors from the article revision state machine.
#[derive(Debug, Error)]
pub enum ArticleError {
    /// Base claim name is unusable
    #[error("invalid article name: {0}")]
    InvalidClaimName(#[from] ClaimNameError),

    /// Publishing channel is not in the local wallet
    #[error("channel {channel} is not available in the wallet")]
    UnknownChannel {
        /// Channel
        channel: String,
    },

    /// Review server was never registered
    #[error("review server {name} is not registered")]
    UnknownServer {
        /// Server
        name: String,
    },

    /// Review server name already registered
    #[error("review server {name} is already registered")]
    ServerExists {
        /// Server
        name: String,
    },

    /// Article already exists
    #[error("article {base} already exists")]
    AlreadyExists {
        /// Article
        base: String,
    },

    /// More than one record for one base name
    #[error("article {base} has {count} records in the local store; refusing to continue")]
    CorruptedStore {
        /// Article
        base: String,
        /// Records found
        count: usize,
    },

    /// No article with this base name
    #[error("article {base} not found")]
    UnknownArticle {
        /// Article
        base: String,
    },

    /// Encryption requested on a reviewed article
    #[error("article {base} has been reviewed; its revisions cannot be encrypted")]
    EncryptAfterReview {
        /// Article
        base: String,
    },

    /// Manuscript file does not exist
    #[error("manuscript file {} does not exist", path.display())]
    FileMissing {
        /// Missing path
        path: PathBuf,
    },

    /// Bundle for this claim already exists on disk
    #[error("claim {claim} was already submitted ({})", path.display())]
    AlreadySubmitted {
        /// Claim
        claim: String,
        /// Existing bundle
        path: PathBuf,
    },

    /// A manuscript with this claim name is already recorded
    #[error("manuscript {claim} already exists")]
    DuplicateClaim {
        /// Claim
        claim: String,
    },

    /// The ledger already holds this claim name
    #[error("claim {claim} is already taken on the ledger")]
    ClaimTaken {
        /// Claim
        claim: String,
    },

    /// Article was already accepted
    #[error("article {base} was already accepted")]
    AlreadyAccepted {
        /// Article
        base: String,
    },

    /// Accept needs at least one published manuscript
    #[error("article {base} has no published manuscript")]
    NothingPublished {
        /// Article
        base: String,
    },

    /// Key handling or encryption failed
    #[error("encryption failed for {entity}: {source}")]
    Crypto {
        /// Article or claim
        entity: String,
        /// Cause
        #[source]
        source: CryptoError,
    },

    /// Ledger call failed
    #[error("ledger call failed for {entity}: {source}")]
    Ledger {
        /// Article or claim
        entity: String,
        /// Cause
        #[source]
        source: LedgerError,
    },

    /// Review server notification failed
    #[error("review server {server} rejected notification for {entity}: {source}")]
    Notification {
        /// Server
        server: String,
        /// Article or claim
        entity: String,
        /// Cause
        #[source]
        source: GatewayError,
    },

    /// Writing the bundle or key files failed
    #[error("could not write artifacts for {claim}: {message}")]
    Bundle {
        /// Claim
        claim: String,
        /// Cause
        message: String,
    },

    /// Local store failed
    #[error("local store error: {0}")]
    Storage(#[from] KVStoreError),

    /// Blocking crypto task was cancelled or panicked
    #[error("background task failed for {entity}: {message}")]
    Task {
        /// Article or claim
        entity: String,
        /// Cause
        message: String,
    },
}

impl Classified for ArticleError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Crypto { .. } | Self::Task { .. } => ErrorKind::Crypto,
            Self::Ledger { source, .. } => source.kind(),
            Self::Notification { source, .. } => source.kind,
            Self::Bundle { .. } | Self::Storage(_) | Self::CorruptedStore { .. } => {
                ErrorKind::Persistence
            }
            _ => ErrorKind::Validation,
        }
    }

    fn stage(&self) -> Stage {
        match self {
            Self::Crypto { .. } | Self::Task { .. } => Stage::Encryption,
            Self::Ledger { source, .. } => source.stage(),
            Self::Notification { .. } => Stage::Network,
            Self::Bundle { .. } | Self::Storage(_) => Stage::Persistence,
            _ => Stage::Validation,
        }
    }
}

impl ArticleError {
    pub(crate) fn crypto(entity: &str, source: CryptoError) -> Self {
        Self::Crypto {
            entity: entity.to_string(),
            source,
        }
    }

    pub(crate) fn ledger(entity: &str, source: LedgerError) -> Self {
        match source {
            LedgerError::ClaimTaken { name } => Self::ClaimTaken { claim: name },
            LedgerError::ChannelNotFound { channel } => Self::UnknownChannel { channel },
            source => Self::Ledger {
                entity: entity.to_string(),
                source,
            },
        }
    }
}
