//! Shared fixture: an author, a reviewer and a review server around one
//! in-memory ledger.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use papr_01_signature_verification::ReviewSignatureService;
use papr_02_article_revisions::{
    ArticleRevisionApi, ArticleRevisionService, ArticleServiceConfig, ArticleServiceDependencies,
    CreateArticle, FileBackedKVStore, PublishRevision,
};
use papr_03_review_rounds::{ReviewRoundConfig, ReviewRoundService};
use papr_04_server_session::FakeReviewServer;
use papr_runtime::adapters::{SessionGateway, StaticChannelKeys};
use shared_crypto::{ScryptCost, Secp256k1KeyPair};
use shared_types::{ArticleMetadata, InMemoryLedger, Server};

pub const FAST: ScryptCost = ScryptCost {
    n: 1024,
    r: 8,
    p: 1,
};

pub const AUTHOR: &str = "@alice";
pub const REVIEWER: &str = "@bob";
pub const SERVER_CHANNEL: &str = "@review";

pub struct World {
    pub dir: tempfile::TempDir,
    pub ledger: Arc<InMemoryLedger>,
    pub server: Arc<FakeReviewServer>,
    pub keys: Arc<StaticChannelKeys>,
    pub author: ArticleRevisionService<FileBackedKVStore>,
    pub reviewer: ReviewSignatureService<InMemoryLedger>,
    pub rounds: ReviewRoundService<InMemoryLedger>,
}

impl World {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(InMemoryLedger::new());
        let server = Arc::new(FakeReviewServer::new("review", SERVER_CHANNEL, FAST));
        let keys = Arc::new(StaticChannelKeys::new());

        for channel in [AUTHOR, REVIEWER] {
            let keypair = Secp256k1KeyPair::generate();
            server.add_client(channel, keypair.public_key());
            ledger.insert_channel(channel, keypair.clone());
            keys.insert(channel, keypair);
        }
        ledger.create_channel(SERVER_CHANNEL);

        let author = Self::author_service(dir.path(), &ledger, &server, &keys);
        author
            .register_server(Server {
                name: "review".into(),
                channel_name: SERVER_CHANNEL.into(),
                url: "https://review.example".into(),
                public_key: None,
            })
            .await
            .unwrap();

        let rounds = ReviewRoundService::new(
            ledger.clone(),
            ReviewRoundConfig {
                review_dir: dir.path().join("reviews"),
                bid: "0.0001".into(),
            },
        );

        Self {
            reviewer: ReviewSignatureService::new(ledger.clone()),
            rounds,
            author,
            keys,
            server,
            ledger,
            dir,
        }
    }

    /// A fresh author service over the same store file, as after a restart.
    pub fn restart_author(&mut self) {
        self.author = Self::author_service(self.dir.path(), &self.ledger, &self.server, &self.keys);
    }

    fn author_service(
        dir: &Path,
        ledger: &Arc<InMemoryLedger>,
        server: &Arc<FakeReviewServer>,
        keys: &Arc<StaticChannelKeys>,
    ) -> ArticleRevisionService<FileBackedKVStore> {
        let gateway = Arc::new(SessionGateway::new(server.clone(), keys.clone()));
        ArticleRevisionService::new(
            ArticleServiceDependencies {
                kv_store: FileBackedKVStore::open(dir.join("papr.db")).unwrap(),
                ledger: ledger.clone(),
                gateway,
            },
            ArticleServiceConfig {
                submission_dir: dir.join("submissions"),
                default_bid: "0.0001".into(),
                scrypt_cost: FAST,
            },
        )
    }

    pub fn submission_dir(&self) -> PathBuf {
        self.dir.path().join("submissions")
    }

    pub fn manuscript(&self, name: &str, body: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    pub async fn create(&self, base: &str, encrypt: bool, server: Option<&str>) -> Option<String> {
        self.author
            .create(CreateArticle {
                base_claim_name: base.into(),
                channel_name: AUTHOR.into(),
                metadata: ArticleMetadata {
                    title: "Measuring Things".into(),
                    abstract_text: "We measure things.".into(),
                    authors: "Alice".into(),
                    tags: vec!["physics".into()],
                },
                encrypt,
                review_server: server.map(str::to_string),
            })
            .await
            .unwrap()
            .encryption_passphrase
    }

    pub fn revision(&self, base: &str, revision: u32, file: PathBuf, encrypt: bool) -> PublishRevision {
        PublishRevision {
            base_claim_name: base.into(),
            revision,
            file_path: file,
            metadata: None,
            encrypt,
            skip_claim_check: false,
        }
    }
}
