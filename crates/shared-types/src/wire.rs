//! Review-server JSON payloads.
//!
//! | Endpoint | Request | Response |
//! |----------|---------|----------|
//! | `POST /api/register/` | [`RegisterRequest`] | [`RegisterResponse`], 201 |
//! | `POST /api/submit/` | [`SubmitRequest`] | server-defined |
//! | `POST /api/accept` | [`AcceptRequest`] | server-defined, 200 |
//! | `POST /api/recommend` | [`RecommendRequest`] | server-defined |
//! | `GET /api/status/{base}` | - | server-defined |
//! | `GET /api/token/{channel}` | - | [`TokenResponse`] |

use serde::{Deserialize, Serialize};

/// Registration body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Channel registering with the server
    pub channel_name: String,
}

/// Registration reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Server name
    pub name: String,
    /// Server channel
    pub channel_name: String,
    /// Anything else the server sends
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Manuscript submission notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Title
    pub title: String,
    /// Article base claim name
    pub article: String,
    /// Claim name of this revision
    pub claim_name: String,
    /// Author list
    pub authors: String,
    /// Publishing channel of the author
    pub corresponding_author: String,
    /// Revision number
    pub revision: u32,
}

/// Acceptance notice. Carries the secrets the server needs to open the
/// article's history.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptRequest {
    /// Article base claim name
    pub base_claim_name: String,
    /// Author channel
    pub channel_name: String,
    /// Article review passphrase
    pub review_passphrase: String,
    /// Revision the article moves to
    pub revision: u32,
    /// Title
    pub title: String,
    /// Abstract
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Author list
    pub authors: String,
    /// Tags
    pub tags: Vec<String>,
    /// Passphrase of the encrypted preprint and revisions, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub encryption_passphrase: Option<String>,
}

impl std::fmt::Debug for AcceptRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcceptRequest")
            .field("base_claim_name", &self.base_claim_name)
            .field("channel_name", &self.channel_name)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

/// Reviewer recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendRequest {
    /// Submission claim name
    pub claim_name: String,
    /// Recommended reviewer
    pub reviewer_name: String,
    /// Channel making the recommendation
    pub recommender_channel: String,
    /// Reviewer channel, if known
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reviewer_channel: Option<String>,
    /// Reviewer email, if known
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reviewer_email: Option<String>,
}

/// Token handshake reply. Both tokens are passphrase envelopes keyed by the
/// ECDH shared secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Server public key, base64 compressed secp256k1
    pub pub_key: String,
    /// Encrypted access token
    pub access: String,
    /// Encrypted refresh token
    pub refresh: String,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("pub_key", &self.pub_key)
            .finish_non_exhaustive()
    }
}
