use papr_01_signature_verification::SignatureError;
use shared_crypto::CryptoError;
use shared_types::{Classified, ErrorKind, LedgerError, Stage};
use thiserror::Error;

/// Review round errors.
#[derive(Debug, Error)]
pub enum ReviewRoundError {
    /// The round has no author public key to encrypt for
    #[error("no author public key for review round of {submission}")]
    MissingAuthorKey {
        /// Reviewed submission
        submission: String,
    },

    /// The author public key could not be parsed
    #[error("author public key of {submission} is unusable: {source}")]
    AuthorKey {
        /// Reviewed submission
        submission: String,
        /// Cause
        #[source]
        source: CryptoError,
    },

    /// The author public key could not be read from disk
    #[error("cannot read author public key of {submission}: {message}")]
    AuthorKeyUnavailable {
        /// Reviewed submission
        submission: String,
        /// Cause
        message: String,
    },

    /// Nothing to aggregate
    #[error("review round of {submission} has no reviews")]
    EmptyRound {
        /// Reviewed submission
        submission: String,
    },

    /// A review artifact could not be parsed or its signer resolved
    #[error("review by {reviewer}: {source}")]
    Signature {
        /// Claimed reviewer channel
        reviewer: String,
        /// Cause
        #[source]
        source: SignatureError,
    },

    /// A review signature does not match the claimed reviewer
    #[error("review of {submission} by {reviewer} has an invalid signature")]
    InvalidSignature {
        /// Reviewed submission
        submission: String,
        /// Claimed reviewer channel
        reviewer: String,
    },

    /// A signed review names a different submission
    #[error("review by {reviewer} was not written for {submission}")]
    WrongSubmission {
        /// Reviewed submission
        submission: String,
        /// Claimed reviewer channel
        reviewer: String,
    },

    /// Encrypting the bundle failed
    #[error("encrypting reviews of {submission} failed: {source}")]
    Crypto {
        /// Reviewed submission
        submission: String,
        /// Cause
        #[source]
        source: CryptoError,
    },

    /// Writing the encrypted bundle failed
    #[error("cannot write review bundle {claim}: {message}")]
    Artifact {
        /// Review claim
        claim: String,
        /// Cause
        message: String,
    },

    /// Publishing the bundle failed
    #[error("publishing review bundle {claim} failed: {source}")]
    Ledger {
        /// Review claim
        claim: String,
        /// Cause
        #[source]
        source: LedgerError,
    },
}

impl Classified for ReviewRoundError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingAuthorKey { .. }
            | Self::AuthorKey { .. }
            | Self::InvalidSignature { .. }
            | Self::Crypto { .. } => ErrorKind::Crypto,
            Self::AuthorKeyUnavailable { .. } | Self::Artifact { .. } => ErrorKind::Persistence,
            Self::EmptyRound { .. } | Self::WrongSubmission { .. } => ErrorKind::Validation,
            Self::Signature { source, .. } => source.kind(),
            Self::Ledger { source, .. } => source.kind(),
        }
    }

    fn stage(&self) -> Stage {
        match self {
            Self::MissingAuthorKey { .. } | Self::AuthorKey { .. } | Self::Crypto { .. } => {
                Stage::Encryption
            }
            Self::AuthorKeyUnavailable { .. } | Self::Artifact { .. } => Stage::Persistence,
            Self::Signature { source, .. } => source.stage(),
            Self::Ledger { source, .. } => source.stage(),
            _ => Stage::Validation,
        }
    }
}
