//! # Article Revisions Subsystem
//!
//! Tracks each article from preprint through revisions to its official
//! versions, and publishes every revision as a claim on the ledger.
//!
//! ## Claim names
//!
//! | reviewed | revision | claim |
//! |----------|----------|-------|
//! | no | 0 | `{base}_preprint` |
//! | no | n | `{base}_r{n}` |
//! | yes | n | `{base}_v{n}` |
//!
//! ## Guarantees
//!
//! - A claim name is recorded at most once; the check is repeated at commit.
//! - A reviewed article never publishes an encrypted revision.
//! - A failed or cancelled publish leaves no bundle, key file or row behind.
//! - `accept` persists nothing unless the review server acknowledged it.
//!
//! ## Module Structure
//!
//! ```text
//! papr-02-article-revisions/
//! ├── domain/     # bundle layout, secrets, errors
//! ├── ports/      # ArticleRevisionApi, KeyValueStore, ReviewServerGateway
//! ├── adapters/   # in-memory and file stores, recording gateway
//! └── service/    # ArticleRevisionService, ArticleRepository
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FileBackedKVStore, GatewayCall, InMemoryKVStore, RecordingGateway};
pub use domain::bundle::{BundleLink, ArtifactGuard};
pub use domain::errors::{ArticleError, KVStoreError};
pub use ports::inbound::{
    AcceptOutcome, ArticleRevisionApi, CreateArticle, CreatedArticle, PublishOutcome,
    PublishRevision,
};
pub use ports::outbound::{BatchOperation, GatewayError, KeyValueStore, ReviewServerGateway};
pub use service::{ArticleRevisionService, ArticleServiceConfig, ArticleServiceDependencies};
