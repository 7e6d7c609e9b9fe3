//! # Domain Layer
//!
//! Artifact layout and errors. No network I/O.

pub mod bundle;
pub mod errors;
pub mod keys;
