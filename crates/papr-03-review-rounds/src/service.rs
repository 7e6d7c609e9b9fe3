//! # Review Round Service
//!
//! Every review is checked against its claimed reviewer before anything is
//! sealed. Signature blocks are stripped, so the sealed bundle carries only
//! the signed bodies under reviewer numbers.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use papr_01_signature_verification::{
    reviewed_submission, ReviewSignatureService, SignatureError, SignedReview,
};
use papr_02_article_revisions::ArtifactGuard;
use shared_crypto::RsaPublicKeyPem;
use shared_types::{LedgerClient, PublishRequest, Server};
use tracing::{info, warn};

use crate::domain::errors::ReviewRoundError;
use crate::domain::round::{format_reviews, ReviewRound, REVIEW_TAGS};
use crate::ports::inbound::{PublishedRound, ReviewRoundApi};

/// Where sealed bundles go and what they are published with.
#[derive(Debug, Clone)]
pub struct ReviewRoundConfig {
    /// Directory for `{claim}_encrypted` files
    pub review_dir: PathBuf,
    /// Ledger bid
    pub bid: String,
}

impl Default for ReviewRoundConfig {
    fn default() -> Self {
        Self {
            review_dir: PathBuf::from("reviews"),
            bid: "0.0001".to_string(),
        }
    }
}

/// Review round aggregation service.
pub struct ReviewRoundService<L: LedgerClient + ?Sized> {
    ledger: Arc<L>,
    verifier: ReviewSignatureService<L>,
    config: ReviewRoundConfig,
}

impl<L: LedgerClient + ?Sized> ReviewRoundService<L> {
    pub fn new(ledger: Arc<L>, config: ReviewRoundConfig) -> Self {
        Self {
            verifier: ReviewSignatureService::new(ledger.clone()),
            ledger,
            config,
        }
    }

    /// Verified bodies, in reviewer order.
    async fn verified_bodies(&self, round: &ReviewRound) -> Result<Vec<String>, ReviewRoundError> {
        let submission = round.submission_name.as_str();
        let mut bodies = Vec::with_capacity(round.submissions().len());

        for entry in round.submissions() {
            let reviewer = entry.reviewer_channel.as_str();
            let signature_error = |source: SignatureError| ReviewRoundError::Signature {
                reviewer: reviewer.to_string(),
                source,
            };

            let signed = SignedReview::parse(&entry.artifact).map_err(signature_error)?;
            if reviewed_submission(&signed.body) != Some(submission) {
                return Err(ReviewRoundError::WrongSubmission {
                    submission: submission.to_string(),
                    reviewer: reviewer.to_string(),
                });
            }

            let valid = self
                .verifier
                .verify_signed(&signed, reviewer)
                .await
                .map_err(signature_error)?;
            if !valid {
                warn!(submission, reviewer, "rejecting review with invalid signature");
                return Err(ReviewRoundError::InvalidSignature {
                    submission: submission.to_string(),
                    reviewer: reviewer.to_string(),
                });
            }

            bodies.push(signed.body);
        }

        Ok(bodies)
    }
}

#[async_trait]
impl<L: LedgerClient + ?Sized> ReviewRoundApi for ReviewRoundService<L> {
    async fn seal(&self, round: &ReviewRound) -> Result<Vec<u8>, ReviewRoundError> {
        let submission = round.submission_name.as_str();

        let pem = round
            .author_public_key
            .as_deref()
            .ok_or_else(|| ReviewRoundError::MissingAuthorKey {
                submission: submission.to_string(),
            })?;
        let author_key =
            RsaPublicKeyPem::from_pem(pem).map_err(|source| ReviewRoundError::AuthorKey {
                submission: submission.to_string(),
                source,
            })?;

        if round.submissions().is_empty() {
            return Err(ReviewRoundError::EmptyRound {
                submission: submission.to_string(),
            });
        }

        let text = format_reviews(&self.verified_bodies(round).await?);
        let sealed = author_key
            .encrypt(text.as_bytes())
            .map_err(|source| ReviewRoundError::Crypto {
                submission: submission.to_string(),
                source,
            })?;

        info!(
            submission,
            round = round.round,
            reviews = round.submissions().len(),
            "review round sealed"
        );
        Ok(sealed)
    }

    async fn publish(
        &self,
        round: &ReviewRound,
        server: &Server,
    ) -> Result<PublishedRound, ReviewRoundError> {
        let sealed = self.seal(round).await?;
        let claim = round.claim_name();
        let artifact_error = |e: std::io::Error| ReviewRoundError::Artifact {
            claim: claim.clone(),
            message: e.to_string(),
        };

        let review_dir = &self.config.review_dir;
        std::fs::create_dir_all(review_dir).map_err(artifact_error)?;
        let path = review_dir.join(round.encrypted_file_name());

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(artifact_error)?;
        let mut artifacts = ArtifactGuard::new();
        artifacts.track(path.clone());
        file.write_all(&sealed).map_err(artifact_error)?;
        file.sync_all().map_err(artifact_error)?;
        drop(file);

        let receipt = self
            .ledger
            .publish_claim(PublishRequest {
                name: claim.clone(),
                bid: self.config.bid.clone(),
                file_path: path.clone(),
                title: round.title(),
                description: round.description(),
                author: server.name.clone(),
                tags: REVIEW_TAGS.iter().map(|t| t.to_string()).collect(),
                channel_name: Some(server.channel_name.clone()),
            })
            .await
            .map_err(|source| ReviewRoundError::Ledger {
                claim: claim.clone(),
                source,
            })?;
        artifacts.disarm();

        info!(
            claim_name = %claim,
            server = %server.name,
            txid = %receipt.txid,
            "review round published"
        );

        Ok(PublishedRound {
            claim_name: claim,
            file_path: path,
            receipt,
        })
    }
}
