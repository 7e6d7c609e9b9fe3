//! Command errors.

use std::path::PathBuf;

use papr_01_signature_verification::SignatureError;
use papr_02_article_revisions::ArticleError;
use papr_03_review_rounds::ReviewRoundError;
use papr_04_server_session::SessionError;
use shared_types::{Classified, ErrorKind, LedgerError, Stage};
use thiserror::Error;

/// Failure of one registry command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command {0}")]
    UnknownCommand(String),

    #[error("invalid parameters for {command}: {message}")]
    InvalidParams { command: String, message: String },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Article(#[from] ArticleError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Round(#[from] ReviewRoundError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl Classified for CommandError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownCommand(_) | Self::InvalidParams { .. } => ErrorKind::Validation,
            Self::Io { .. } => ErrorKind::Persistence,
            Self::Article(e) => e.kind(),
            Self::Signature(e) => e.kind(),
            Self::Round(e) => e.kind(),
            Self::Session(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
        }
    }

    fn stage(&self) -> Stage {
        match self {
            Self::UnknownCommand(_) | Self::InvalidParams { .. } => Stage::Validation,
            Self::Io { .. } => Stage::Persistence,
            Self::Article(e) => e.stage(),
            Self::Signature(e) => e.stage(),
            Self::Round(e) => e.stage(),
            Self::Session(e) => e.stage(),
            Self::Ledger(e) => e.stage(),
        }
    }
}
