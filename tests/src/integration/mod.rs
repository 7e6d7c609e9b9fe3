//! Cross-subsystem flows. Every test wires real services over the
//! in-memory ledger and an in-process review server.

mod flows;
mod session_recovery;

#[cfg(test)]
pub(crate) mod world;
