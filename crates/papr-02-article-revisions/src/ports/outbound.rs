//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the article service needs from the host. The ledger port
//! lives in `shared_types::LedgerClient`.

use async_trait::async_trait;
use shared_types::wire::{AcceptRequest, SubmitRequest};
use shared_types::{ErrorKind, Server};
use thiserror::Error;

use crate::domain::errors::KVStoreError;

/// Result of a prefix scan.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Abstract interface for key-value persistence.
///
/// Production: `FileBackedKVStore`
/// Testing: `InMemoryKVStore`
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch are applied, or NONE are.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError>;

    /// Iterate over keys with a prefix.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put {
        /// Key
        key: Vec<u8>,
        /// Value
        value: Vec<u8>,
    },
    /// Delete a key.
    Delete {
        /// Key
        key: Vec<u8>,
    },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Failure reported by a review-server gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GatewayError {
    /// Error class of the underlying failure
    pub kind: ErrorKind,
    /// Description
    pub message: String,
}

/// Notifications the article service sends to an article's review server.
#[async_trait]
pub trait ReviewServerGateway: Send + Sync {
    /// A new revision was published.
    async fn submit(&self, server: &Server, request: SubmitRequest) -> Result<(), GatewayError>;

    /// The author accepts the review outcome. Must succeed for the accept to
    /// be committed.
    async fn accept(&self, server: &Server, request: AcceptRequest) -> Result<(), GatewayError>;
}
