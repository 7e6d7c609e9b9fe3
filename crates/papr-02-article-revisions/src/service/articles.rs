//! `ArticleRevisionApi` implementation.

use async_trait::async_trait;
use chrono::Utc;
use shared_crypto::passphrase::encrypt_with_cost;
use shared_crypto::{generate_passphrase, CryptoError};
use shared_types::wire::{AcceptRequest, SubmitRequest};
use shared_types::{
    validate_base_claim_name, Article, ArticleMetadata, Manuscript, PublishRequest, Report, Review,
    Server, ServerDescriptor,
};
use tokio::task::JoinError;
use tracing::{error, info, warn};

use super::ArticleRevisionService;
use crate::domain::bundle::{bundle_file_name, write_bundle, write_key_files, ArtifactGuard, BundleLink};
use crate::domain::errors::ArticleError;
use crate::domain::keys::{self, generate_article_secrets};
use crate::ports::inbound::{
    AcceptOutcome, ArticleRevisionApi, CreateArticle, CreatedArticle, PublishOutcome,
    PublishRevision,
};
use crate::ports::outbound::KeyValueStore;

fn task_failed(entity: &str) -> impl FnOnce(JoinError) -> ArticleError + '_ {
    move |e| ArticleError::Task {
        entity: entity.to_string(),
        message: e.to_string(),
    }
}

fn bundle_failed(claim: &str) -> impl FnOnce(std::io::Error) -> ArticleError + '_ {
    move |e| ArticleError::Bundle {
        claim: claim.to_string(),
        message: e.to_string(),
    }
}

impl<KV: KeyValueStore> ArticleRevisionService<KV> {
    /// Metadata of the latest manuscript, else what the article was created with.
    fn latest_metadata(&self, article: &Article) -> Result<ArticleMetadata, ArticleError> {
        Ok(self
            .repo
            .manuscripts_of(&article.base_claim_name)?
            .pop()
            .map(|m| m.metadata)
            .unwrap_or_else(|| article.metadata.clone()))
    }

    fn linked_server(&self, article: &Article) -> Result<Option<Server>, ArticleError> {
        article
            .review_server
            .as_deref()
            .map(|name| self.repo.get_server(name))
            .transpose()
    }
}

#[async_trait]
impl<KV: KeyValueStore> ArticleRevisionApi for ArticleRevisionService<KV> {
    async fn create(&self, request: CreateArticle) -> Result<CreatedArticle, ArticleError> {
        let base = request.base_claim_name.as_str();
        validate_base_claim_name(base)?;

        self.ledger
            .find_channel(&request.channel_name)
            .await
            .map_err(|e| ArticleError::ledger(base, e))?;
        if let Some(server) = &request.review_server {
            self.repo.get_server(server)?;
        }

        let _guard = self.lock_article(base).await;

        match self.repo.articles_named(base)?.len() {
            0 => {}
            1 => {
                return Err(ArticleError::AlreadyExists {
                    base: base.to_string(),
                })
            }
            count => {
                error!(article = base, count, "multiple article records for one base name");
                return Err(ArticleError::CorruptedStore {
                    base: base.to_string(),
                    count,
                });
            }
        }

        let encrypt = request.encrypt;
        let secrets = tokio::task::spawn_blocking(move || generate_article_secrets(encrypt))
            .await
            .map_err(task_failed(base))?
            .map_err(|e| ArticleError::crypto(base, e))?;

        let article = Article {
            base_claim_name: base.to_string(),
            channel_name: request.channel_name.clone(),
            revision: 0,
            reviewed: false,
            review_passphrase: secrets.review_passphrase.as_str().to_owned(),
            encryption_passphrase: secrets
                .encryption_passphrase
                .as_ref()
                .map(|p| p.as_str().to_owned()),
            review_server: request.review_server.clone(),
            metadata: request.metadata.clone(),
            public_key_pem: secrets.public_key_pem,
            encrypted_private_key: secrets.encrypted_private_key,
            created_at: Utc::now(),
        };
        self.repo.insert_article(&article)?;

        info!(
            article = base,
            channel = %article.channel_name,
            encrypted = encrypt,
            "article created"
        );

        Ok(CreatedArticle {
            review_passphrase: article.review_passphrase.clone(),
            encryption_passphrase: article.encryption_passphrase.clone(),
            article,
        })
    }

    async fn publish(&self, request: PublishRevision) -> Result<PublishOutcome, ArticleError> {
        let base = request.base_claim_name.as_str();
        let _guard = self.lock_article(base).await;
        let article = self.repo.get_article(base)?;

        if article.reviewed && request.encrypt {
            return Err(ArticleError::EncryptAfterReview {
                base: base.to_string(),
            });
        }

        let claim = article.claim_name_for(request.revision);
        if !request.file_path.is_file() {
            return Err(ArticleError::FileMissing {
                path: request.file_path.clone(),
            });
        }

        let submission_dir = &self.config.submission_dir;
        let bundle_path = submission_dir.join(bundle_file_name(&claim));
        if bundle_path.exists() {
            return Err(ArticleError::AlreadySubmitted {
                claim,
                path: bundle_path,
            });
        }
        if self.repo.claim_recorded(&claim)? {
            return Err(ArticleError::DuplicateClaim { claim });
        }

        if !request.skip_claim_check {
            let free = self
                .ledger
                .is_claim_free(&claim)
                .await
                .map_err(|e| ArticleError::ledger(&claim, e))?;
            if !free {
                return Err(ArticleError::ClaimTaken { claim });
            }
        }

        let channel = self
            .ledger
            .find_channel(&article.channel_name)
            .await
            .map_err(|e| ArticleError::ledger(&claim, e))?;
        let server = self.linked_server(&article)?;
        let metadata = match request.metadata {
            Some(metadata) => metadata,
            None => self.latest_metadata(&article)?,
        };

        let mut content = tokio::fs::read(&request.file_path)
            .await
            .map_err(bundle_failed(&claim))?;

        let mut next = article.clone();
        if request.encrypt {
            let passphrase = match &article.encryption_passphrase {
                Some(existing) => existing.clone(),
                None => generate_passphrase().as_str().to_owned(),
            };
            next.encryption_passphrase = Some(passphrase.clone());

            let cost = self.config.scrypt_cost;
            let envelope =
                tokio::task::spawn_blocking(move || encrypt_with_cost(&passphrase, &content, cost))
                    .await
                    .map_err(task_failed(&claim))?
                    .map_err(|e| ArticleError::crypto(&claim, e))?;
            content = envelope.into_bytes();
        }

        // From here on every file written is removed again unless the
        // manuscript gets committed, including when this future is dropped.
        let mut artifacts = ArtifactGuard::new();
        std::fs::create_dir_all(submission_dir).map_err(bundle_failed(&claim))?;

        let link = match &server {
            Some(server) => BundleLink::Server(ServerDescriptor::from(server)),
            None => BundleLink::PublicKey(article.public_key_pem.clone()),
        };
        write_bundle(submission_dir, &claim, &content, &link, &mut artifacts)
            .map_err(bundle_failed(&claim))?;
        write_key_files(
            submission_dir,
            &claim,
            &article.encrypted_private_key,
            &article.public_key_pem,
            &mut artifacts,
        )
        .map_err(bundle_failed(&claim))?;

        let receipt = self
            .ledger
            .publish_claim(PublishRequest {
                name: claim.clone(),
                bid: self.config.default_bid.clone(),
                file_path: bundle_path,
                title: metadata.title.clone(),
                description: metadata.abstract_text.clone(),
                author: metadata.authors.clone(),
                tags: metadata.tags.clone(),
                channel_name: Some(channel.name.clone()),
            })
            .await
            .map_err(|e| ArticleError::ledger(&claim, e))?;

        let manuscript = Manuscript {
            claim_name: claim.clone(),
            base_claim_name: base.to_string(),
            channel_name: article.channel_name.clone(),
            revision: request.revision,
            reviewed: article.reviewed,
            encrypted: request.encrypt,
            file_path: request.file_path.clone(),
            metadata,
            bid: self.config.default_bid.clone(),
            submission_date: Utc::now(),
            txid: receipt.txid.clone(),
            claim_id: receipt.claim_id.clone(),
        };
        next.revision = next.revision.max(request.revision);

        if let Err(e) = self.repo.commit_publish(&next, &manuscript) {
            error!(
                article = base,
                claim_name = %claim,
                txid = %receipt.txid,
                error = %e,
                "claim is on the ledger but could not be recorded locally"
            );
            return Err(e);
        }
        artifacts.disarm();

        info!(
            article = base,
            claim_name = %claim,
            revision = request.revision,
            encrypted = request.encrypt,
            txid = %receipt.txid,
            "manuscript published"
        );

        let mut warnings = Vec::new();
        if let Some(server) = server {
            let notice = SubmitRequest {
                title: manuscript.metadata.title.clone(),
                article: base.to_string(),
                claim_name: claim.clone(),
                authors: manuscript.metadata.authors.clone(),
                corresponding_author: article.channel_name.clone(),
                revision: request.revision,
            };
            if let Err(e) = self.gateway.submit(&server, notice).await {
                let report = Report::warning(format!(
                    "review server {} was not notified of {claim}: {e}",
                    server.name
                ));
                report.log();
                warnings.push(report);
            }
        }

        Ok(PublishOutcome {
            manuscript,
            warnings,
        })
    }

    async fn accept(&self, base_claim_name: &str) -> Result<AcceptOutcome, ArticleError> {
        let base = base_claim_name;
        let _guard = self.lock_article(base).await;
        let article = self.repo.get_article(base)?;

        if article.reviewed {
            return Err(ArticleError::AlreadyAccepted {
                base: base.to_string(),
            });
        }
        if self.repo.manuscripts_of(base)?.is_empty() {
            return Err(ArticleError::NothingPublished {
                base: base.to_string(),
            });
        }

        let mut next = article.clone();
        next.reviewed = true;
        next.revision = 1;
        let encryption_passphrase = next.encryption_passphrase.take();

        let notified = if let Some(server) = self.linked_server(&article)? {
            let metadata = self.latest_metadata(&article)?;
            let notice = AcceptRequest {
                base_claim_name: base.to_string(),
                channel_name: article.channel_name.clone(),
                review_passphrase: article.review_passphrase.clone(),
                revision: next.revision,
                title: metadata.title,
                abstract_text: metadata.abstract_text,
                authors: metadata.authors,
                tags: metadata.tags,
                encryption_passphrase: encryption_passphrase.clone(),
            };
            self.gateway
                .accept(&server, notice)
                .await
                .map_err(|source| ArticleError::Notification {
                    server: server.name.clone(),
                    entity: base.to_string(),
                    source,
                })?;
            Some(server.name)
        } else {
            None
        };

        if let Err(e) = self.repo.update_article(&next) {
            if let Some(server) = &notified {
                error!(
                    article = base,
                    server = %server,
                    error = %e,
                    "server was notified of acceptance but the local update failed"
                );
            }
            return Err(e);
        }
        info!(article = base, "article accepted");

        Ok(AcceptOutcome {
            article: next,
            encryption_passphrase,
        })
    }

    async fn register_server(&self, server: Server) -> Result<(), ArticleError> {
        self.repo.insert_server(&server)?;
        info!(server = %server.name, url = %server.url, "review server registered");
        Ok(())
    }

    async fn server(&self, name: &str) -> Result<Server, ArticleError> {
        self.repo.get_server(name)
    }

    async fn set_server_public_key(
        &self,
        name: &str,
        public_key: String,
    ) -> Result<(), ArticleError> {
        self.repo.set_server_public_key(name, public_key)
    }

    async fn article(&self, base_claim_name: &str) -> Result<Article, ArticleError> {
        self.repo.get_article(base_claim_name)
    }

    async fn manuscripts(&self, base_claim_name: &str) -> Result<Vec<Manuscript>, ArticleError> {
        self.repo.get_article(base_claim_name)?;
        self.repo.manuscripts_of(base_claim_name)
    }

    async fn metadata(&self, base_claim_name: &str) -> Result<ArticleMetadata, ArticleError> {
        let article = self.repo.get_article(base_claim_name)?;
        self.latest_metadata(&article)
    }

    async fn save_review(&self, review: Review) -> Result<(), ArticleError> {
        if !review.is_sent() {
            warn!(
                submission = %review.submission_claim_name,
                "saving unsigned review draft"
            );
        }
        self.repo.save_review(&review)
    }

    async fn reviews(&self) -> Result<Vec<Review>, ArticleError> {
        self.repo.list_reviews()
    }

    async fn open_review_bundle(
        &self,
        base_claim_name: &str,
        ciphertext: &[u8],
    ) -> Result<String, ArticleError> {
        let base = base_claim_name;
        let article = self.repo.get_article(base)?;

        let encrypted_key = article.encrypted_private_key;
        let passphrase = article.review_passphrase;
        let ciphertext = ciphertext.to_vec();
        let plaintext = tokio::task::spawn_blocking(move || {
            keys::open_review_bundle(&encrypted_key, &passphrase, &ciphertext)
        })
        .await
        .map_err(task_failed(base))?
        .map_err(|e| ArticleError::crypto(base, e))?;

        String::from_utf8(plaintext).map_err(|e| {
            ArticleError::crypto(base, CryptoError::DecryptionFailed(e.to_string()))
        })
    }
}
