//! # Adapters Layer
//!
//! Storage backends and a recording review-server gateway.

pub mod gateway;
pub mod storage;

pub use gateway::{GatewayCall, RecordingGateway};
pub use storage::{FileBackedKVStore, InMemoryKVStore};
