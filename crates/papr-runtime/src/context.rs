//! # Runtime Context
//!
//! Builds every service once and hands them to command handlers.
//!
//! ```text
//! LbryDaemonClient ──► LedgerClient ─┬─► ArticleRevisionService ◄── FileBackedKVStore
//!        │                           ├─► ReviewSignatureService
//!        │                           └─► ReviewRoundService
//!        └──► ChannelKeys ──► SessionGateway ◄── ReqwestTransport
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use papr_01_signature_verification::ReviewSignatureService;
use papr_02_article_revisions::{
    ArticleRevisionApi, ArticleRevisionService, ArticleServiceConfig, ArticleServiceDependencies,
    FileBackedKVStore, KeyValueStore,
};
use papr_03_review_rounds::{ReviewRoundConfig, ReviewRoundService};
use papr_04_server_session::{HttpTransport, ReqwestTransport, TransportConfig};
use shared_crypto::ScryptCost;
use shared_types::LedgerClient;
use tracing::{info, warn};

use crate::adapters::{LbryDaemonClient, SessionGateway};
use crate::config::PaprConfig;
use crate::ports::ChannelKeys;

/// What [`PaprContext::assemble`] wires together.
pub struct ContextParts<KV> {
    pub config: PaprConfig,
    pub ledger: Arc<dyn LedgerClient>,
    pub keys: Arc<dyn ChannelKeys>,
    pub kv_store: KV,
    pub transport: Arc<dyn HttpTransport>,
    pub scrypt_cost: ScryptCost,
}

/// Services shared by all commands.
pub struct PaprContext {
    pub config: PaprConfig,
    pub ledger: Arc<dyn LedgerClient>,
    pub articles: Arc<dyn ArticleRevisionApi>,
    pub signatures: ReviewSignatureService<dyn LedgerClient>,
    pub rounds: ReviewRoundService<dyn LedgerClient>,
    pub gateway: Arc<SessionGateway<dyn HttpTransport>>,
}

impl PaprContext {
    /// Wire services from already built adapters.
    pub fn assemble<KV: KeyValueStore + 'static>(parts: ContextParts<KV>) -> Self {
        let gateway = Arc::new(SessionGateway::new(parts.transport, parts.keys));

        let articles = ArticleRevisionService::new(
            ArticleServiceDependencies {
                kv_store: parts.kv_store,
                ledger: parts.ledger.clone(),
                gateway: gateway.clone(),
            },
            ArticleServiceConfig {
                submission_dir: parts.config.paths.submission_dir.clone(),
                default_bid: parts.config.ledger.default_bid.clone(),
                scrypt_cost: parts.scrypt_cost,
            },
        );
        let rounds = ReviewRoundService::new(
            parts.ledger.clone(),
            ReviewRoundConfig {
                review_dir: parts.config.paths.review_dir.clone(),
                bid: parts.config.ledger.default_bid.clone(),
            },
        );

        Self {
            signatures: ReviewSignatureService::new(parts.ledger.clone()),
            articles: Arc::new(articles),
            ledger: parts.ledger,
            rounds,
            gateway,
            config: parts.config,
        }
    }

    /// Production wiring: wallet daemon, file store, reqwest transport.
    pub fn open(config: PaprConfig) -> Result<Self> {
        for dir in [&config.paths.submission_dir, &config.paths.review_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating directory {}", dir.display()))?;
        }

        let daemon = Arc::new(
            LbryDaemonClient::new(&config.ledger.daemon_url, config.session.request_timeout())
                .context("creating ledger daemon client")?,
        );
        let kv_store = FileBackedKVStore::open(&config.paths.database_path).with_context(|| {
            format!("opening local store {}", config.paths.database_path.display())
        })?;
        let transport = ReqwestTransport::new(TransportConfig {
            request_timeout: config.session.request_timeout(),
            connect_timeout: config.session.connect_timeout(),
        })
        .map_err(|e| anyhow::anyhow!("creating HTTP transport: {}", e.0))?;

        info!(
            daemon_url = %config.ledger.daemon_url,
            database = %config.paths.database_path.display(),
            "runtime context ready"
        );

        Ok(Self::assemble(ContextParts {
            ledger: daemon.clone(),
            keys: daemon,
            kv_store,
            transport: Arc::new(transport),
            scrypt_cost: ScryptCost::DEFAULT,
            config,
        }))
    }

    /// Persist a server key learned during a handshake, if none is stored.
    pub async fn remember_server_key(&self, server_name: &str) {
        let Ok(server) = self.articles.server(server_name).await else {
            return;
        };
        if server.public_key.is_some() {
            return;
        }
        let Some(key) = self.gateway.learned_key(server_name) else {
            return;
        };

        match self.articles.set_server_public_key(server_name, key).await {
            Ok(()) => info!(server = server_name, "stored server public key"),
            Err(e) => warn!(server = server_name, error = %e, "could not store server public key"),
        }
    }
}
