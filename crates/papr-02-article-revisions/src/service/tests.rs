//! # Article Revision Service Tests

use std::io::Read;
use std::path::{Path, PathBuf};

use super::*;
use crate::adapters::{GatewayCall, InMemoryKVStore, RecordingGateway};
use crate::domain::errors::ArticleError;
use crate::ports::inbound::{ArticleRevisionApi, CreateArticle, CreatedArticle, PublishRevision};
use crate::ports::outbound::GatewayError;
use shared_crypto::{passphrase, RsaPublicKeyPem};
use shared_types::{
    ArticleMetadata, ArticleState, ChannelInfo, Classified, ErrorKind, InMemoryLedger, LedgerClient,
    LedgerError, PublishReceipt, PublishRequest, ResolvedClaim, Server, SignedPayload,
};

const FAST: ScryptCost = ScryptCost {
    n: 1024,
    r: 8,
    p: 1,
};

struct Harness {
    service: ArticleRevisionService<InMemoryKVStore>,
    ledger: Arc<InMemoryLedger>,
    gateway: Arc<RecordingGateway>,
    dir: tempfile::TempDir,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(InMemoryLedger::new());
        ledger.create_channel("@alice");
        let gateway = Arc::new(RecordingGateway::new());

        let service = ArticleRevisionService::new(
            ArticleServiceDependencies {
                kv_store: InMemoryKVStore::new(),
                ledger: ledger.clone(),
                gateway: gateway.clone(),
            },
            ArticleServiceConfig {
                submission_dir: dir.path().join("submissions"),
                default_bid: "0.0001".into(),
                scrypt_cost: FAST,
            },
        );

        Self {
            service,
            ledger,
            gateway,
            dir,
        }
    }

    fn submissions(&self) -> PathBuf {
        self.dir.path().join("submissions")
    }

    fn manuscript_file(&self, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join("paper.pdf");
        std::fs::write(&path, contents).unwrap();
        path
    }

    async fn register_server(&self) {
        self.service
            .register_server(Server {
                name: "review".into(),
                channel_name: "@review".into(),
                url: "https://review.example".into(),
                public_key: None,
            })
            .await
            .unwrap();
    }

    async fn create(&self, base: &str, encrypt: bool, server: Option<&str>) -> CreatedArticle {
        self.service
            .create(CreateArticle {
                base_claim_name: base.into(),
                channel_name: "@alice".into(),
                metadata: metadata("Initial"),
                encrypt,
                review_server: server.map(Into::into),
            })
            .await
            .unwrap()
    }

    fn publish_request(&self, base: &str, revision: u32, encrypt: bool) -> PublishRevision {
        PublishRevision {
            base_claim_name: base.into(),
            revision,
            file_path: self.manuscript_file(b"%PDF-1.4 manuscript"),
            metadata: None,
            encrypt,
            skip_claim_check: false,
        }
    }

    fn submission_files(&self) -> Vec<String> {
        match std::fs::read_dir(self.submissions()) {
            Ok(entries) => {
                let mut names: Vec<_> = entries
                    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                    .collect();
                names.sort();
                names
            }
            Err(_) => Vec::new(),
        }
    }
}

fn metadata(title: &str) -> ArticleMetadata {
    ArticleMetadata {
        title: title.into(),
        abstract_text: "We study things.".into(),
        authors: "Alice Example".into(),
        tags: vec!["physics".into()],
    }
}

fn read_entry(path: &Path, name: &str) -> Option<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).ok()?;
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf).unwrap();
    Some(buf)
}

#[tokio::test]
async fn test_publish_preprint_writes_bundle_and_claim() {
    let h = Harness::new();
    h.create("paper", false, None).await;

    let mut request = h.publish_request("paper", 0, false);
    request.metadata = Some(metadata("First look"));
    let outcome = h.service.publish(request).await.unwrap();

    assert_eq!(outcome.manuscript.claim_name, "paper_preprint");
    assert!(outcome.warnings.is_empty());
    assert_eq!(
        h.submission_files(),
        ["paper_preprint.zip", "paper_preprint_key", "paper_preprint_key.pub"]
    );

    let bundle = h.submissions().join("paper_preprint.zip");
    assert_eq!(
        read_entry(&bundle, "Manuscript_paper_preprint.pdf").unwrap(),
        b"%PDF-1.4 manuscript"
    );
    assert!(read_entry(&bundle, "paper_preprint_key.pub").is_some());

    let claim = h.ledger.claim("paper_preprint").unwrap();
    assert_eq!(claim.request.title, "First look");
    assert_eq!(claim.request.description, "We study things.");
    assert_eq!(claim.request.author, "Alice Example");
    assert_eq!(claim.request.channel_name.as_deref(), Some("@alice"));
    assert_eq!(claim.receipt.txid, outcome.manuscript.txid);

    let article = h.service.article("paper").await.unwrap();
    assert_eq!(article.state(true), ArticleState::PreprintPublished);
}

#[tokio::test]
async fn test_revision_tracks_maximum_published() {
    let h = Harness::new();
    h.create("paper", false, None).await;

    for revision in [0, 2, 1] {
        h.service
            .publish(h.publish_request("paper", revision, false))
            .await
            .unwrap();
    }

    assert_eq!(h.service.article("paper").await.unwrap().revision, 2);
    let claims: Vec<_> = h
        .service
        .manuscripts("paper")
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.claim_name)
        .collect();
    assert_eq!(claims, ["paper_preprint", "paper_r1", "paper_r2"]);
}

#[tokio::test]
async fn test_encrypt_after_review_always_rejected() {
    let h = Harness::new();
    h.create("paper", false, None).await;
    h.service
        .publish(h.publish_request("paper", 0, false))
        .await
        .unwrap();
    h.service.accept("paper").await.unwrap();
    let claims_before = h.ledger.claim_count();

    for revision in [0, 1, 2, 17] {
        let err = h
            .service
            .publish(h.publish_request("paper", revision, true))
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleError::EncryptAfterReview { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    assert_eq!(h.ledger.claim_count(), claims_before);
    assert_eq!(h.service.manuscripts("paper").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_preprint_keeps_original() {
    let h = Harness::new();
    h.create("paper", false, None).await;

    let mut first = h.publish_request("paper", 0, false);
    first.metadata = Some(metadata("Original"));
    h.service.publish(first).await.unwrap();

    let mut second = h.publish_request("paper", 0, false);
    second.metadata = Some(metadata("Replacement"));
    let err = h.service.publish(second.clone()).await.unwrap_err();
    assert!(matches!(err, ArticleError::AlreadySubmitted { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);

    // Without the bundle on disk the local record still refuses.
    std::fs::remove_file(h.submissions().join("paper_preprint.zip")).unwrap();
    let err = h.service.publish(second).await.unwrap_err();
    assert!(matches!(err, ArticleError::DuplicateClaim { .. }));

    let manuscripts = h.service.manuscripts("paper").await.unwrap();
    assert_eq!(manuscripts.len(), 1);
    assert_eq!(manuscripts[0].metadata.title, "Original");
}

#[tokio::test]
async fn test_missing_file() {
    let h = Harness::new();
    h.create("paper", false, None).await;

    let mut request = h.publish_request("paper", 0, false);
    request.file_path = h.dir.path().join("nope.pdf");
    let err = h.service.publish(request).await.unwrap_err();

    assert!(matches!(err, ArticleError::FileMissing { .. }));
    assert!(h.submission_files().is_empty());
}

#[tokio::test]
async fn test_claim_taken_on_ledger() {
    let h = Harness::new();
    h.create("paper", false, None).await;

    let squatter = h.dir.path().join("squat.zip");
    std::fs::write(&squatter, b"squat").unwrap();
    h.ledger
        .publish_claim(shared_types::PublishRequest {
            name: "paper_preprint".into(),
            bid: "0.0001".into(),
            file_path: squatter,
            title: "Squatted".into(),
            description: String::new(),
            author: String::new(),
            tags: vec![],
            channel_name: None,
        })
        .await
        .unwrap();

    let err = h
        .service
        .publish(h.publish_request("paper", 0, false))
        .await
        .unwrap_err();
    assert!(matches!(err, ArticleError::ClaimTaken { .. }));
    assert!(h.submission_files().is_empty());

    // Skipping the check leaves the ledger to arbitrate.
    let mut request = h.publish_request("paper", 0, false);
    request.skip_claim_check = true;
    let err = h.service.publish(request).await.unwrap_err();
    assert!(matches!(err, ArticleError::ClaimTaken { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(h.submission_files().is_empty());
    assert!(h.service.manuscripts("paper").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ledger_failure_rolls_back() {
    let h = Harness::new();
    h.create("paper", true, None).await;
    let before = h.service.article("paper").await.unwrap();

    h.ledger
        .fail_next_publish(LedgerError::Connection("connection refused".into()));
    let err = h
        .service
        .publish(h.publish_request("paper", 0, true))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.to_string().contains("paper_preprint"));
    assert!(h.submission_files().is_empty());
    assert!(h.service.manuscripts("paper").await.unwrap().is_empty());
    assert_eq!(h.service.article("paper").await.unwrap(), before);

    h.service
        .publish(h.publish_request("paper", 0, true))
        .await
        .unwrap();
    assert_eq!(h.service.manuscripts("paper").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_encrypted_manuscript_opens_with_passphrase() {
    let h = Harness::new();
    let created = h.create("paper", true, None).await;
    let secret = created.encryption_passphrase.unwrap();
    assert_eq!(secret.split(' ').count(), 7);

    let outcome = h
        .service
        .publish(h.publish_request("paper", 0, true))
        .await
        .unwrap();
    assert!(outcome.manuscript.encrypted);

    let bundle = h.submissions().join("paper_preprint.zip");
    let entry = read_entry(&bundle, "Manuscript_paper_preprint.pdf").unwrap();
    let envelope = String::from_utf8(entry).unwrap();
    assert_ne!(envelope.as_bytes(), b"%PDF-1.4 manuscript");
    assert_eq!(
        passphrase::decrypt(&secret, &envelope).unwrap(),
        b"%PDF-1.4 manuscript"
    );
}

#[tokio::test]
async fn test_accept_notifies_server_and_clears_passphrase() {
    let h = Harness::new();
    h.register_server().await;
    let created = h.create("paper", true, Some("review")).await;

    h.service
        .publish(h.publish_request("paper", 0, true))
        .await
        .unwrap();
    let bundle = h.submissions().join("paper_preprint.zip");
    let descriptor: serde_json::Value =
        serde_json::from_slice(&read_entry(&bundle, "server.json").unwrap()).unwrap();
    assert_eq!(descriptor["channel_name"], "@review");

    let outcome = h.service.accept("paper").await.unwrap();
    assert!(outcome.article.reviewed);
    assert_eq!(outcome.article.revision, 1);
    assert_eq!(outcome.article.encryption_passphrase, None);
    assert_eq!(outcome.encryption_passphrase, created.encryption_passphrase);

    let calls = h.gateway.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[0], GatewayCall::Submit { request, .. } if request.claim_name == "paper_preprint"));
    match &calls[1] {
        GatewayCall::Accept { server, request } => {
            assert_eq!(server, "review");
            assert_eq!(request.review_passphrase, created.review_passphrase);
            assert_eq!(request.encryption_passphrase, created.encryption_passphrase);
            assert_eq!(request.revision, 1);
        }
        other => panic!("unexpected call {other:?}"),
    }

    let stored = h.service.article("paper").await.unwrap();
    assert_eq!(stored.state(true), ArticleState::Official(1));
    let v1 = h
        .service
        .publish(h.publish_request("paper", 1, false))
        .await
        .unwrap();
    assert_eq!(v1.manuscript.claim_name, "paper_v1");
    assert!(v1.manuscript.reviewed);
}

#[tokio::test]
async fn test_accept_rolls_back_on_notification_failure() {
    let h = Harness::new();
    h.register_server().await;
    h.create("paper", true, Some("review")).await;
    h.service
        .publish(h.publish_request("paper", 2, true))
        .await
        .unwrap();
    let before = h.service.article("paper").await.unwrap();

    h.gateway.fail_with(Some(GatewayError {
        kind: ErrorKind::Network,
        message: "502 Bad Gateway".into(),
    }));
    let err = h.service.accept("paper").await.unwrap_err();

    assert!(matches!(err, ArticleError::Notification { .. }));
    assert_eq!(err.kind(), ErrorKind::Network);
    let after = h.service.article("paper").await.unwrap();
    assert_eq!(after, before);
    assert!(!after.reviewed);
    assert_eq!(after.revision, 2);
    assert!(after.encryption_passphrase.is_some());
}

#[tokio::test]
async fn test_accept_store_failure_after_notification() {
    let h = Harness::new();
    h.register_server().await;
    h.create("paper", true, Some("review")).await;
    h.service
        .publish(h.publish_request("paper", 0, true))
        .await
        .unwrap();

    h.service.repo.store.lock().fail_writes(true);
    let err = h.service.accept("paper").await.unwrap_err();
    h.service.repo.store.lock().fail_writes(false);

    assert!(matches!(err, ArticleError::Storage(_)));
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert!(matches!(h.gateway.calls().last(), Some(GatewayCall::Accept { .. })));
    let stored = h.service.article("paper").await.unwrap();
    assert!(!stored.reviewed);
    assert!(stored.encryption_passphrase.is_some());
}

#[tokio::test]
async fn test_submit_notification_failure_is_warning() {
    let h = Harness::new();
    h.register_server().await;
    h.create("paper", false, Some("review")).await;
    h.gateway.fail_with(Some(GatewayError {
        kind: ErrorKind::Network,
        message: "timeout".into(),
    }));

    let outcome = h
        .service
        .publish(h.publish_request("paper", 0, false))
        .await
        .unwrap();

    assert_eq!(outcome.warnings.len(), 1);
    assert!(!outcome.warnings[0].is_error());
    assert_eq!(h.service.manuscripts("paper").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_publishes_of_one_claim() {
    let h = Harness::new();
    h.create("paper", false, None).await;

    let (a, b) = tokio::join!(
        h.service.publish(h.publish_request("paper", 0, false)),
        h.service.publish(h.publish_request("paper", 0, false)),
    );

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert_eq!(h.service.manuscripts("paper").await.unwrap().len(), 1);
    assert_eq!(h.ledger.claim_count(), 1);
}

#[tokio::test]
async fn test_cancelled_publish_leaves_nothing() {
    let h = Harness::new();
    h.create("paper", false, None).await;

    // Hold the article lock so the publish parks before doing anything.
    let guard = h.service.lock_article("paper").await;
    let publish = h.service.publish(h.publish_request("paper", 0, false));
    let timed_out = tokio::time::timeout(std::time::Duration::from_millis(20), publish).await;
    drop(guard);

    assert!(timed_out.is_err());
    assert!(h.submission_files().is_empty());
    assert!(h.service.manuscripts("paper").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_rejections() {
    let h = Harness::new();
    h.create("paper", false, None).await;

    let request = |base: &str, channel: &str, server: Option<&str>| CreateArticle {
        base_claim_name: base.into(),
        channel_name: channel.into(),
        metadata: ArticleMetadata::default(),
        encrypt: false,
        review_server: server.map(Into::into),
    };

    let err = h.service.create(request("paper", "@alice", None)).await.unwrap_err();
    assert!(matches!(err, ArticleError::AlreadyExists { .. }));

    let err = h.service.create(request("my paper", "@alice", None)).await.unwrap_err();
    assert!(matches!(err, ArticleError::InvalidClaimName(_)));

    let err = h.service.create(request("other", "@mallory", None)).await.unwrap_err();
    assert!(matches!(err, ArticleError::UnknownChannel { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = h
        .service
        .create(request("other", "@alice", Some("nowhere")))
        .await
        .unwrap_err();
    assert!(matches!(err, ArticleError::UnknownServer { .. }));
}

#[tokio::test]
async fn test_accept_preconditions() {
    let h = Harness::new();
    h.create("paper", false, None).await;

    let err = h.service.accept("paper").await.unwrap_err();
    assert!(matches!(err, ArticleError::NothingPublished { .. }));

    h.service
        .publish(h.publish_request("paper", 0, false))
        .await
        .unwrap();
    h.service.accept("paper").await.unwrap();

    let err = h.service.accept("paper").await.unwrap_err();
    assert!(matches!(err, ArticleError::AlreadyAccepted { .. }));
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_metadata_follows_latest_manuscript() {
    let h = Harness::new();
    h.create("paper", false, None).await;
    assert_eq!(h.service.metadata("paper").await.unwrap().title, "Initial");

    let mut request = h.publish_request("paper", 0, false);
    request.metadata = Some(metadata("Preprint title"));
    h.service.publish(request).await.unwrap();

    // Without new metadata the previous revision's carries over.
    h.service
        .publish(h.publish_request("paper", 1, false))
        .await
        .unwrap();
    assert_eq!(h.ledger.claim("paper_r1").unwrap().request.title, "Preprint title");

    let mut request = h.publish_request("paper", 2, false);
    request.metadata = Some(metadata("Second revision"));
    h.service.publish(request).await.unwrap();
    assert_eq!(
        h.service.metadata("paper").await.unwrap().title,
        "Second revision"
    );
}

#[tokio::test]
async fn test_open_review_bundle() {
    let h = Harness::new();
    let created = h.create("paper", false, None).await;

    let public = RsaPublicKeyPem::from_pem(&created.article.public_key_pem).unwrap();
    let ciphertext = public.encrypt("--- BEGINNING OF REVIEW ---".as_bytes()).unwrap();

    let text = h.service.open_review_bundle("paper", &ciphertext).await.unwrap();
    assert_eq!(text, "--- BEGINNING OF REVIEW ---");

    let err = h
        .service
        .open_review_bundle("paper", b"garbage")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Crypto);
}

#[tokio::test]
async fn test_reviews_are_persisted() {
    let h = Harness::new();
    let mut review = shared_types::Review::draft("other_preprint", "@bob", "@alice", "Solid.");
    review.review_signature = Some("ab".into());
    review.review_signature_timestamp = Some("1700000000".into());
    review.review_date = Some(chrono::Utc::now());

    h.service.save_review(review.clone()).await.unwrap();
    assert_eq!(h.service.reviews().await.unwrap(), vec![review]);
}

#[tokio::test]
async fn test_write_failure_removes_files_already_written() {
    let h = Harness::new();
    h.create("paper", false, None).await;

    // The public key file cannot be created, after the bundle and private
    // key were already written.
    std::fs::create_dir_all(h.submissions().join("paper_preprint_key.pub")).unwrap();
    let err = h
        .service
        .publish(h.publish_request("paper", 0, false))
        .await
        .unwrap_err();

    assert!(matches!(err, ArticleError::Bundle { .. }));
    assert_eq!(h.submission_files(), ["paper_preprint_key.pub"]);
    assert!(h.service.manuscripts("paper").await.unwrap().is_empty());
    assert_eq!(h.ledger.claim_count(), 0);

    std::fs::remove_dir(h.submissions().join("paper_preprint_key.pub")).unwrap();
    h.service
        .publish(h.publish_request("paper", 0, false))
        .await
        .unwrap();
    assert_eq!(h.service.manuscripts("paper").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_debug_output_hides_passphrases() {
    let h = Harness::new();
    h.register_server().await;
    let created = h.create("paper", true, Some("review")).await;
    let encryption = created.encryption_passphrase.clone().unwrap();

    let shown = format!("{created:?}");
    assert!(!shown.contains(&created.review_passphrase));
    assert!(!shown.contains(&encryption));
    assert!(shown.contains("encrypted: true"));

    h.service
        .publish(h.publish_request("paper", 0, true))
        .await
        .unwrap();
    let outcome = h.service.accept("paper").await.unwrap();
    let shown = format!("{outcome:?}");
    assert!(!shown.contains(&encryption));
    assert!(shown.contains("was_encrypted: true"));
}

/// Delegates to an in-memory ledger but never finishes publishing.
struct StalledLedger {
    inner: Arc<InMemoryLedger>,
    publishing: tokio::sync::Notify,
}

#[async_trait::async_trait]
impl LedgerClient for StalledLedger {
    async fn resolve(&self, name: &str) -> Result<Option<ResolvedClaim>, LedgerError> {
        self.inner.resolve(name).await
    }

    async fn publish_claim(&self, _request: PublishRequest) -> Result<PublishReceipt, LedgerError> {
        self.publishing.notify_one();
        std::future::pending().await
    }

    async fn sign_payload(
        &self,
        channel_name: &str,
        payload: &[u8],
    ) -> Result<SignedPayload, LedgerError> {
        self.inner.sign_payload(channel_name, payload).await
    }

    async fn list_channels(&self) -> Result<Vec<ChannelInfo>, LedgerError> {
        self.inner.list_channels().await
    }
}

#[tokio::test]
async fn test_publish_dropped_while_claim_pending_removes_files() {
    let h = Harness::new();
    let ledger = Arc::new(StalledLedger {
        inner: h.ledger.clone(),
        publishing: tokio::sync::Notify::new(),
    });
    let service = ArticleRevisionService::new(
        ArticleServiceDependencies {
            kv_store: InMemoryKVStore::new(),
            ledger: ledger.clone(),
            gateway: h.gateway.clone(),
        },
        ArticleServiceConfig {
            submission_dir: h.submissions(),
            default_bid: "0.0001".into(),
            scrypt_cost: FAST,
        },
    );
    service
        .create(CreateArticle {
            base_claim_name: "paper".into(),
            channel_name: "@alice".into(),
            metadata: metadata("Initial"),
            encrypt: false,
            review_server: None,
        })
        .await
        .unwrap();

    let publish = service.publish(h.publish_request("paper", 0, false));
    tokio::pin!(publish);
    tokio::select! {
        _ = &mut publish => panic!("publish finished against a ledger that never answers"),
        _ = ledger.publishing.notified() => {}
    }
    assert_eq!(
        h.submission_files(),
        ["paper_preprint.zip", "paper_preprint_key", "paper_preprint_key.pub"]
    );

    let timed_out = tokio::time::timeout(std::time::Duration::from_millis(50), &mut publish).await;
    assert!(timed_out.is_err());
    drop(publish);

    assert!(h.submission_files().is_empty());
    assert!(service.manuscripts("paper").await.unwrap().is_empty());
    assert_eq!(h.ledger.claim_count(), 0);
}
