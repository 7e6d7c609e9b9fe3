//! # Article Revision Service
//!
//! Implements [`ArticleRevisionApi`](crate::ports::inbound::ArticleRevisionApi).
//!
//! ## Publish pipeline
//!
//! | Step | Stage | Side effects on failure |
//! |------|-------|-------------------------|
//! | mode, file, bundle, duplicate checks | validation | none |
//! | ledger availability check | network | none |
//! | encrypt manuscript | encryption | none |
//! | write bundle and key files | persistence | files removed |
//! | publish claim | network | files removed |
//! | commit manuscript + article | persistence | files removed |
//! | notify review server | network | reported as a warning |
//!
//! All steps run while holding the article's lock, so two publishes of one
//! article never interleave.

mod articles;
mod repository;
#[cfg(test)]
mod tests;

pub use repository::ArticleRepository;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use shared_crypto::ScryptCost;
use shared_types::LedgerClient;
use tokio::sync::OwnedMutexGuard;

use crate::ports::outbound::{KeyValueStore, ReviewServerGateway};

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ArticleServiceConfig {
    /// Where bundles and key files are written
    pub submission_dir: PathBuf,
    /// Bid for every published claim
    pub default_bid: String,
    /// Cost of the manuscript encryption envelope
    pub scrypt_cost: ScryptCost,
}

impl Default for ArticleServiceConfig {
    fn default() -> Self {
        Self {
            submission_dir: PathBuf::from("submissions"),
            default_bid: "0.0001".to_string(),
            scrypt_cost: ScryptCost::DEFAULT,
        }
    }
}

/// Dependencies for ArticleRevisionService
pub struct ArticleServiceDependencies<KV> {
    pub kv_store: KV,
    pub ledger: Arc<dyn LedgerClient>,
    pub gateway: Arc<dyn ReviewServerGateway>,
}

/// The article revision service.
pub struct ArticleRevisionService<KV: KeyValueStore> {
    pub(crate) repo: ArticleRepository<KV>,
    pub(crate) ledger: Arc<dyn LedgerClient>,
    pub(crate) gateway: Arc<dyn ReviewServerGateway>,
    pub(crate) config: ArticleServiceConfig,
    locks: parking_lot::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<KV: KeyValueStore> ArticleRevisionService<KV> {
    pub fn new(deps: ArticleServiceDependencies<KV>, config: ArticleServiceConfig) -> Self {
        Self {
            repo: ArticleRepository::new(deps.kv_store),
            ledger: deps.ledger,
            gateway: deps.gateway,
            config,
            locks: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ArticleServiceConfig {
        &self.config
    }

    /// Serialize work on one base name. Held across awaits.
    pub(crate) async fn lock_article(&self, base: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .lock()
            .entry(base.to_string())
            .or_default()
            .clone();
        lock.lock_owned().await
    }
}
