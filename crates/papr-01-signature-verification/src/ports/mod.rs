//! # Ports Layer
//!
//! The outbound dependency is `shared_types::LedgerClient`.

pub mod inbound;
