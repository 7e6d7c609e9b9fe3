//! # Papr Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks for the crypto primitives
//! └── src/integration/  # Flows spanning several subsystems
//!     ├── flows.rs            # author, reviewer and server end to end
//!     └── session_recovery.rs # review-server failures during publish
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p papr-tests
//! cargo bench -p papr-tests
//! ```

pub mod integration;
