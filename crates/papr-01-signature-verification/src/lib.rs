//! # Review Signature Verification Subsystem (PAPR-01)
//!
//! Signs reviews on behalf of a reviewer channel and verifies that a review
//! artifact was signed by the channel it claims.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): artifact format and errors, no I/O
//! - **Ports Layer** (`ports/`): the inbound API trait
//! - **Service Layer** (`service.rs`): wires the domain to a `LedgerClient`
//!
//! ## Signed Digest
//!
//! `SHA-256(signing_ts || claim_hash(channel) || body)`. The ledger picks
//! `signing_ts` when it signs; verifiers read it back from the artifact.
//!
//! ## Security Notes
//!
//! - A signature that fails to verify yields `Ok(false)`, never an error.
//! - High-S signatures are normalized before verification.

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::artifact::{review_body, reviewed_submission, SignedReview, SIGNATURE_DELIMITER};
pub use domain::errors::SignatureError;
pub use ports::inbound::ReviewSignatureApi;
pub use service::ReviewSignatureService;
