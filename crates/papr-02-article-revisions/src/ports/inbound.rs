//! # Inbound Ports (Driving Ports)
//!
//! The article lifecycle API exposed to the runtime.
//!
//! ## Lifecycle
//!
//! ```text
//! create ──► Created ──publish(0)──► PreprintPublished ──publish(n)──► RevisionPublished(n)
//!                                                                         │
//!                                                  accept ◄───────────────┘
//!                                                    │
//!                                                    ▼
//!                                   Accepted ──publish(n)──► Official(n)
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use shared_types::{Article, ArticleMetadata, Manuscript, Report, Review, Server};

use crate::domain::errors::ArticleError;

/// Parameters of [`ArticleRevisionApi::create`].
#[derive(Debug, Clone)]
pub struct CreateArticle {
    /// Stable slug; revisions are published under names derived from it
    pub base_claim_name: String,
    /// Publishing channel, must be in the local wallet
    pub channel_name: String,
    /// Initial metadata
    pub metadata: ArticleMetadata,
    /// Start out as a private submission
    pub encrypt: bool,
    /// Registered review server coordinating this article
    pub review_server: Option<String>,
}

/// Result of a successful create.
///
/// The passphrases are handed to the local caller only. They leave the
/// process later, and only toward the article's own review server on accept.
pub struct CreatedArticle {
    /// Stored article
    pub article: Article,
    /// Protects the article private key
    pub review_passphrase: String,
    /// Set when the article was created private
    pub encryption_passphrase: Option<String>,
}

impl std::fmt::Debug for CreatedArticle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatedArticle")
            .field("article", &self.article)
            .field("encrypted", &self.encryption_passphrase.is_some())
            .finish_non_exhaustive()
    }
}

/// Parameters of [`ArticleRevisionApi::publish`].
#[derive(Debug, Clone)]
pub struct PublishRevision {
    /// Article to publish under
    pub base_claim_name: String,
    /// Revision number
    pub revision: u32,
    /// Manuscript file
    pub file_path: PathBuf,
    /// Metadata of this revision; the latest published metadata when `None`
    pub metadata: Option<ArticleMetadata>,
    /// Encrypt the manuscript entry
    pub encrypt: bool,
    /// Skip the ledger availability check for the claim name
    pub skip_claim_check: bool,
}

/// Result of a successful publish.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    /// Recorded manuscript
    pub manuscript: Manuscript,
    /// Non-fatal problems, e.g. a review server that could not be notified
    pub warnings: Vec<Report>,
}

/// Result of a successful accept.
pub struct AcceptOutcome {
    /// Updated article
    pub article: Article,
    /// Passphrase of the encrypted history, now cleared from the store
    pub encryption_passphrase: Option<String>,
}

impl std::fmt::Debug for AcceptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcceptOutcome")
            .field("article", &self.article)
            .field("was_encrypted", &self.encryption_passphrase.is_some())
            .finish_non_exhaustive()
    }
}

/// Primary API of the article revision subsystem.
///
/// Implementations serialize all mutations of one article; different
/// articles proceed concurrently.
#[async_trait]
pub trait ArticleRevisionApi: Send + Sync {
    /// Create an article at revision 0.
    ///
    /// ## Errors
    ///
    /// - `InvalidClaimName`: empty name or reserved character
    /// - `UnknownChannel`: channel not in the wallet
    /// - `UnknownServer`: review server not registered
    /// - `AlreadyExists`: an article with this base name exists
    /// - `CorruptedStore`: more than one record for this base name
    async fn create(&self, request: CreateArticle) -> Result<CreatedArticle, ArticleError>;

    /// Publish one revision.
    ///
    /// Nothing is written to disk or the store unless the ledger accepts the
    /// claim. A cancelled publish leaves no artifact behind.
    ///
    /// ## Errors
    ///
    /// - `EncryptAfterReview`: `encrypt` on a reviewed article
    /// - `FileMissing`, `AlreadySubmitted`, `DuplicateClaim`, `ClaimTaken`
    /// - `Ledger`, `Bundle`, `Storage`, `Crypto`
    async fn publish(&self, request: PublishRevision) -> Result<PublishOutcome, ArticleError>;

    /// Mark the article reviewed and move it to revision 1.
    ///
    /// With a review server, the server must acknowledge the acceptance
    /// before anything is persisted.
    async fn accept(&self, base_claim_name: &str) -> Result<AcceptOutcome, ArticleError>;

    /// Register a review coordinator.
    async fn register_server(&self, server: Server) -> Result<(), ArticleError>;

    /// Look up a registered review coordinator.
    async fn server(&self, name: &str) -> Result<Server, ArticleError>;

    /// Record the server's public key once learned from a handshake.
    async fn set_server_public_key(&self, name: &str, public_key: String)
        -> Result<(), ArticleError>;

    /// Look up an article.
    async fn article(&self, base_claim_name: &str) -> Result<Article, ArticleError>;

    /// Published manuscripts, unreviewed first, then by revision.
    async fn manuscripts(&self, base_claim_name: &str) -> Result<Vec<Manuscript>, ArticleError>;

    /// Metadata of the latest manuscript, or the creation metadata.
    async fn metadata(&self, base_claim_name: &str) -> Result<ArticleMetadata, ArticleError>;

    /// Persist a review written by this user.
    async fn save_review(&self, review: Review) -> Result<(), ArticleError>;

    /// Reviews written by this user.
    async fn reviews(&self) -> Result<Vec<Review>, ArticleError>;

    /// Decrypt a review bundle addressed to this article.
    async fn open_review_bundle(
        &self,
        base_claim_name: &str,
        ciphertext: &[u8],
    ) -> Result<String, ArticleError>;
}
