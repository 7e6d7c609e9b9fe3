//! # Inbound Ports (Driving Ports / API)

use async_trait::async_trait;
use shared_types::Review;

use crate::domain::artifact::SignedReview;
use crate::domain::errors::SignatureError;

/// Review signing and identity verification API.
#[async_trait]
pub trait ReviewSignatureApi: Send + Sync {
    /// Have `channel` sign `body`.
    async fn sign(&self, body: &str, channel: &str) -> Result<SignedReview, SignatureError>;

    /// Sign a review draft as its reviewer channel.
    ///
    /// Records signature, timestamp and review date on `review` and returns
    /// the text artifact to send to the review server.
    async fn sign_review(&self, review: &mut Review) -> Result<String, SignatureError>;

    /// Check that `artifact` was signed by `claimed_channel`.
    ///
    /// Returns `Ok(false)` for a signature that does not verify. Errors are
    /// reserved for malformed artifacts and resolution failures.
    async fn verify(&self, artifact: &str, claimed_channel: &str) -> Result<bool, SignatureError>;
}
