//! # Review Rounds Subsystem (PAPR-03)
//!
//! Collects the signed reviews of one submission, verifies each against its
//! claimed reviewer, and seals them into one bundle only the author can open.
//!
//! ## Bundle Layout
//!
//! ```text
//! --- BEGINNING OF REVIEW ---
//!
//! *** REVIEWER 1 ***
//!
//! {body of the first review added}
//!
//!
//! *** REVIEWER 2 ***
//! ...
//! --- END OF REVIEW ---
//! ```
//!
//! Reviewer channels never appear in the sealed text.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::author_key::read_author_key;
pub use domain::errors::ReviewRoundError;
pub use domain::round::{format_reviews, ReviewRound, ReviewSubmission, REVIEW_TAGS};
pub use ports::inbound::{PublishedRound, ReviewRoundApi};
pub use service::{ReviewRoundConfig, ReviewRoundService};
