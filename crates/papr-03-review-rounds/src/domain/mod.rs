//! # Domain Layer
//!
//! Round bookkeeping, bundle formatting and author key lookup.

pub mod author_key;
pub mod errors;
pub mod round;
