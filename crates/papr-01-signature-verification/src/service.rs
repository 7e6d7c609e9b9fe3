//! # Review Signature Service
//!
//! Implements [`ReviewSignatureApi`] over a [`LedgerClient`]: the ledger signs
//! on behalf of the reviewer channel and resolves channel keys for
//! verification.

use std::sync::Arc;

use async_trait::async_trait;
use shared_crypto::{signable_digest, Secp256k1PublicKey, Secp256k1Signature};
use shared_types::{LedgerClient, Review};
use tracing::{debug, info, warn};

use crate::domain::artifact::{review_body, SignedReview};
use crate::domain::errors::SignatureError;
use crate::ports::inbound::ReviewSignatureApi;

/// Review signing and verification service.
pub struct ReviewSignatureService<L: LedgerClient + ?Sized> {
    ledger: Arc<L>,
}

impl<L: LedgerClient + ?Sized> ReviewSignatureService<L> {
    /// Create a new service over `ledger`.
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Verify an already parsed review.
    pub async fn verify_signed(
        &self,
        review: &SignedReview,
        claimed_channel: &str,
    ) -> Result<bool, SignatureError> {
        let resolved = self
            .ledger
            .resolve(claimed_channel)
            .await?
            .ok_or_else(|| SignatureError::IdentityNotFound {
                channel: claimed_channel.to_string(),
            })?;

        let invalid_key = || SignatureError::InvalidIdentityKey {
            channel: claimed_channel.to_string(),
        };
        let key_bytes = resolved.public_key.as_deref().ok_or_else(invalid_key)?;
        let public_key = Secp256k1PublicKey::parse(key_bytes).map_err(|_| invalid_key())?;

        let claim_hash = resolved.claim_hash()?;
        let digest = signable_digest(&review.signing_ts, &claim_hash, review.body.as_bytes());
        let signature = Secp256k1Signature::from_slice(&review.signature)
            .map_err(|e| SignatureError::MalformedSignature(e.to_string()))?;

        let valid = public_key.verify_prehash(&digest, &signature);
        if valid {
            debug!(channel = claimed_channel, "review signature verified");
        } else {
            warn!(channel = claimed_channel, "review signature does not match");
        }
        Ok(valid)
    }
}

#[async_trait]
impl<L: LedgerClient + ?Sized> ReviewSignatureApi for ReviewSignatureService<L> {
    async fn sign(&self, body: &str, channel: &str) -> Result<SignedReview, SignatureError> {
        let signed = self.ledger.sign_payload(channel, body.as_bytes()).await?;

        Ok(SignedReview {
            body: body.to_string(),
            signature: signed.signature,
            signing_ts: signed.signing_ts,
        })
    }

    async fn sign_review(&self, review: &mut Review) -> Result<String, SignatureError> {
        let body = review_body(
            &review.submission_claim_name,
            review.submission_url.as_deref(),
            &review.review_text,
        );
        let signed = self.sign(&body, &review.reviewer_channel).await?;

        review.review_signature = Some(hex::encode(&signed.signature));
        review.review_signature_timestamp = Some(signed.signing_ts.clone());
        review.review_date = Some(chrono::Utc::now());

        info!(
            submission = %review.submission_claim_name,
            reviewer = %review.reviewer_channel,
            "review signed"
        );
        Ok(signed.to_artifact())
    }

    async fn verify(&self, artifact: &str, claimed_channel: &str) -> Result<bool, SignatureError> {
        let review = SignedReview::parse(artifact)?;
        self.verify_signed(&review, claimed_channel).await
    }
}
