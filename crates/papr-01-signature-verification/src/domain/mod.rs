//! # Domain Layer
//!
//! Pure review-artifact logic, no I/O.

pub mod artifact;
pub mod errors;
