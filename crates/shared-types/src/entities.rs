//! # Core Domain Entities
//!
//! ## Ownership
//!
//! - An `Article` owns its `Manuscript`s (append-only, one per revision).
//! - An `Article` references at most one `Server` by name.
//! - A `Review` references the submission it reviews and the `Server` that
//!   relays it.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::claim::derive_claim_name;

/// Descriptive metadata published with a manuscript revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    /// Title
    pub title: String,
    /// Abstract, published as the claim description
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Author list as free text
    pub authors: String,
    /// Claim tags
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Lifecycle position of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArticleState {
    /// Created, nothing published yet.
    Created,
    /// `{base}_preprint` is out.
    PreprintPublished,
    /// Latest unreviewed revision `n > 0`.
    RevisionPublished(u32),
    /// Accepted by the review coordinator; no official version yet.
    Accepted,
    /// Official version `n` is out.
    Official(u32),
}

/// An article: a stable base claim name under one publishing channel.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Human-chosen stable slug
    pub base_claim_name: String,
    /// Publishing channel (e.g. `@alice`)
    pub channel_name: String,
    /// Highest published revision
    pub revision: u32,
    /// One-way flag set by `accept`
    pub reviewed: bool,
    /// Protects the article's private key
    pub review_passphrase: String,
    /// Present only while the article is a private, unreviewed submission
    pub encryption_passphrase: Option<String>,
    /// Review coordinator, by server name
    pub review_server: Option<String>,
    /// Metadata given at creation; the latest manuscript supersedes it
    #[serde(default)]
    pub metadata: ArticleMetadata,
    /// Article public key (SubjectPublicKeyInfo PEM)
    pub public_key_pem: String,
    /// Article private key, PKCS#8 PEM inside a passphrase envelope
    pub encrypted_private_key: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Claim name `revision` would be published under right now.
    pub fn claim_name_for(&self, revision: u32) -> String {
        derive_claim_name(&self.base_claim_name, self.reviewed, revision)
    }

    /// Lifecycle state. `has_manuscripts` tells whether a manuscript exists
    /// in the current phase: unreviewed before accept, reviewed after.
    pub fn state(&self, has_manuscripts: bool) -> ArticleState {
        match (self.reviewed, has_manuscripts, self.revision) {
            (false, false, _) => ArticleState::Created,
            (false, true, 0) => ArticleState::PreprintPublished,
            (false, true, n) => ArticleState::RevisionPublished(n),
            (true, _, n) => {
                // accept sets revision = 1 before v1 exists
                if has_manuscripts && n > 0 {
                    ArticleState::Official(n)
                } else {
                    ArticleState::Accepted
                }
            }
        }
    }
}

impl fmt::Debug for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Article")
            .field("base_claim_name", &self.base_claim_name)
            .field("channel_name", &self.channel_name)
            .field("revision", &self.revision)
            .field("reviewed", &self.reviewed)
            .field("encrypted", &self.encryption_passphrase.is_some())
            .field("review_server", &self.review_server)
            .finish_non_exhaustive()
    }
}

/// One published revision of an article. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manuscript {
    /// Derived claim name
    pub claim_name: String,
    /// Owning article
    pub base_claim_name: String,
    /// Owning article's channel
    pub channel_name: String,
    /// Revision number
    pub revision: u32,
    /// Whether the article was reviewed at publish time
    pub reviewed: bool,
    /// Whether the manuscript entry was encrypted
    pub encrypted: bool,
    /// Source file
    pub file_path: PathBuf,
    /// Published metadata
    #[serde(flatten)]
    pub metadata: ArticleMetadata,
    /// Ledger bid
    pub bid: String,
    /// Publish time
    pub submission_date: DateTime<Utc>,
    /// Publish transaction id
    pub txid: String,
    /// Ledger claim id
    pub claim_id: String,
}

/// A review written by this user about someone else's submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Local identifier
    pub id: Uuid,
    /// Reviewed submission's claim name (carries the revision)
    pub submission_claim_name: String,
    /// Reviewed submission's channel
    pub submission_channel_name: String,
    /// Reviewed submission's URL, if known
    pub submission_url: Option<String>,
    /// Reviewer channel that signs the review
    pub reviewer_channel: String,
    /// Review body
    pub review_text: String,
    /// Hex-encoded signature
    pub review_signature: Option<String>,
    /// Signing timestamp chosen by the ledger
    pub review_signature_timestamp: Option<String>,
    /// Set when the signed review is recorded
    pub review_date: Option<DateTime<Utc>>,
    /// Relaying review server, by name
    pub server: Option<String>,
}

impl Review {
    /// Unsigned review draft.
    pub fn draft(
        submission_claim_name: impl Into<String>,
        submission_channel_name: impl Into<String>,
        reviewer_channel: impl Into<String>,
        review_text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            submission_claim_name: submission_claim_name.into(),
            submission_channel_name: submission_channel_name.into(),
            submission_url: None,
            reviewer_channel: reviewer_channel.into(),
            review_text: review_text.into(),
            review_signature: None,
            review_signature_timestamp: None,
            review_date: None,
            server: None,
        }
    }

    /// True once both signature and timestamp are recorded.
    pub fn is_sent(&self) -> bool {
        self.review_signature.is_some() && self.review_signature_timestamp.is_some()
    }
}

/// A remote review coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Local name
    pub name: String,
    /// Publishing channel of the server
    pub channel_name: String,
    /// Base URL
    pub url: String,
    /// Base64 compressed secp256k1 key; fetched lazily on first handshake
    pub public_key: Option<String>,
}

/// `server.json` entry of a server-linked bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    /// Server name
    pub name: String,
    /// Server channel
    pub channel_name: String,
    /// Server URL
    pub url: String,
}

impl From<&Server> for ServerDescriptor {
    fn from(server: &Server) -> Self {
        Self {
            name: server.name.clone(),
            channel_name: server.channel_name.clone(),
            url: server.url.clone(),
        }
    }
}
