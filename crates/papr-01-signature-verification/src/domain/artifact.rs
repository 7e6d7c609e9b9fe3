//! # Signed Review Artifacts
//!
//! ```text
//! {body}{SIGNATURE_DELIMITER}{hex(signature)}\n{signing_ts}
//! ```
//!
//! The body is everything before the last delimiter, so a review that quotes
//! the delimiter still parses.

use crate::domain::errors::SignatureError;

/// Separates the review body from its signature block.
pub const SIGNATURE_DELIMITER: &str = "\n\n--- REVIEW SIGNATURE ---\n";

/// Signature length (r||s).
pub const SIGNATURE_LEN: usize = 64;

/// A review body together with its channel signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedReview {
    /// Signed text
    pub body: String,
    /// 64-byte signature
    pub signature: Vec<u8>,
    /// Timestamp string bound into the digest
    pub signing_ts: String,
}

impl SignedReview {
    /// Render as a text artifact.
    pub fn to_artifact(&self) -> String {
        format!(
            "{}{SIGNATURE_DELIMITER}{}\n{}",
            self.body,
            hex::encode(&self.signature),
            self.signing_ts
        )
    }

    /// Parse a text artifact.
    ///
    /// # Errors
    ///
    /// `MissingDelimiter`, `MalformedSignature` or `MalformedTimestamp`.
    pub fn parse(artifact: &str) -> Result<Self, SignatureError> {
        let (body, appendix) = artifact
            .rsplit_once(SIGNATURE_DELIMITER)
            .ok_or(SignatureError::MissingDelimiter)?;

        let (signature_hex, signing_ts) = appendix
            .split_once('\n')
            .ok_or_else(|| SignatureError::MalformedTimestamp(String::new()))?;

        let signature = hex::decode(signature_hex.trim())
            .map_err(|e| SignatureError::MalformedSignature(e.to_string()))?;
        if signature.len() != SIGNATURE_LEN {
            return Err(SignatureError::MalformedSignature(format!(
                "expected {SIGNATURE_LEN} bytes, got {}",
                signature.len()
            )));
        }

        let signing_ts = signing_ts.trim_end_matches(['\n', '\r']);
        if !is_timestamp(signing_ts) {
            return Err(SignatureError::MalformedTimestamp(signing_ts.to_string()));
        }

        Ok(Self {
            body: body.to_string(),
            signature,
            signing_ts: signing_ts.to_string(),
        })
    }
}

/// Unix seconds, optionally fractional.
fn is_timestamp(ts: &str) -> bool {
    !ts.is_empty()
        && ts
            .parse::<f64>()
            .map(|v| v.is_finite() && v >= 0.0)
            .unwrap_or(false)
        && ts.chars().all(|c| c.is_ascii_digit() || c == '.')
}

const BODY_HEADER: &str = "Review for submission ";

/// Text a reviewer signs: a header naming the submission, then the review.
pub fn review_body(submission_claim: &str, submission_url: Option<&str>, text: &str) -> String {
    match submission_url {
        Some(url) => format!("{BODY_HEADER}{submission_claim} ({url})\n\n{text}"),
        None => format!("{BODY_HEADER}{submission_claim}\n\n{text}"),
    }
}

/// Claim name named in the header of a body built by [`review_body`].
pub fn reviewed_submission(body: &str) -> Option<&str> {
    let (header, _) = body.strip_prefix(BODY_HEADER)?.split_once("\n\n")?;
    let claim = header.split_once(' ').map_or(header, |(claim, _)| claim);
    (!claim.is_empty()).then_some(claim)
}
