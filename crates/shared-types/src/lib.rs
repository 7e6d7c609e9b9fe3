//! # Shared Types Crate
//!
//! Domain entities, the claim naming contract, the ledger capability port and
//! the error taxonomy used by every Papr subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: cross-subsystem types live here.
//! - **Narrow ledger port**: subsystems depend on [`LedgerClient`], never on
//!   a daemon implementation.
//! - **Classified errors**: every subsystem error reports an [`ErrorKind`]
//!   and a [`Stage`].

pub mod claim;
pub mod entities;
pub mod errors;
pub mod ledger;
pub mod report;
pub mod wire;

pub use claim::{derive_claim_name, review_claim_name, validate_base_claim_name, ClaimNameError};
pub use entities::*;
pub use errors::*;
pub use ledger::*;
pub use report::{Report, Severity};
