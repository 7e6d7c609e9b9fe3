//! # Inbound Ports (Driving Ports / API)

use std::path::PathBuf;

use async_trait::async_trait;
use shared_types::{PublishReceipt, Server};

use crate::domain::errors::ReviewRoundError;
use crate::domain::round::ReviewRound;

/// A review bundle released on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRound {
    /// `{submission}_review{round}`
    pub claim_name: String,
    /// Sealed bundle on disk
    pub file_path: PathBuf,
    /// Ledger receipt
    pub receipt: PublishReceipt,
}

/// Review round aggregation API.
#[async_trait]
pub trait ReviewRoundApi: Send + Sync {
    /// Verify every review, format them in reviewer order and seal the
    /// result for the author.
    ///
    /// ## Errors
    ///
    /// - `MissingAuthorKey` when no author key was set
    /// - `EmptyRound`, `InvalidSignature`, `WrongSubmission`, `Signature`
    async fn seal(&self, round: &ReviewRound) -> Result<Vec<u8>, ReviewRoundError>;

    /// Seal the round and publish it under `server`'s channel.
    ///
    /// Nothing stays on disk if publishing fails or is cancelled.
    async fn publish(
        &self,
        round: &ReviewRound,
        server: &Server,
    ) -> Result<PublishedRound, ReviewRoundError>;
}
