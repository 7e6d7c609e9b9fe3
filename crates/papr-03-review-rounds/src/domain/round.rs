//! # Review Rounds
//!
//! A round collects the signed reviews of one submission in reviewer order.
//! The order is never changed: reviewer `i` in the published bundle is the
//! `i`-th review added.

use shared_types::review_claim_name;

/// Opens every review bundle.
pub const BUNDLE_HEADER: &str = "--- BEGINNING OF REVIEW ---\n\n";

/// Closes every review bundle.
pub const BUNDLE_FOOTER: &str = "--- END OF REVIEW ---";

/// Tags of a published review bundle.
pub const REVIEW_TAGS: [&str; 2] = ["PAPR", "PAPR-review"];

/// One reviewer's signed artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmission {
    /// Channel that claims to have signed the artifact
    pub reviewer_channel: String,
    /// Signed review artifact
    pub artifact: String,
}

/// Reviews of one submission, plus the key they are sealed for.
#[derive(Debug, Clone)]
pub struct ReviewRound {
    /// Reviewed claim, e.g. `paper_preprint`
    pub submission_name: String,
    /// 1-based round number
    pub round: u32,
    /// Author channel of the submission
    pub author_channel: String,
    /// Author public key PEM
    pub author_public_key: Option<String>,
    submissions: Vec<ReviewSubmission>,
}

impl ReviewRound {
    pub fn new(
        submission_name: impl Into<String>,
        round: u32,
        author_channel: impl Into<String>,
    ) -> Self {
        Self {
            submission_name: submission_name.into(),
            round,
            author_channel: author_channel.into(),
            author_public_key: None,
            submissions: Vec::new(),
        }
    }

    /// Append the next reviewer's artifact.
    pub fn add_review(&mut self, reviewer_channel: impl Into<String>, artifact: impl Into<String>) {
        self.submissions.push(ReviewSubmission {
            reviewer_channel: reviewer_channel.into(),
            artifact: artifact.into(),
        });
    }

    pub fn set_author_key(&mut self, pem: impl Into<String>) {
        self.author_public_key = Some(pem.into());
    }

    pub fn submissions(&self) -> &[ReviewSubmission] {
        &self.submissions
    }

    /// `{submission}_review{round}`
    pub fn claim_name(&self) -> String {
        review_claim_name(&self.submission_name, self.round)
    }

    /// File name of the sealed bundle in the review directory.
    pub fn encrypted_file_name(&self) -> String {
        format!("{}_encrypted", self.claim_name())
    }

    pub fn title(&self) -> String {
        format!(
            "Review {} of {} by {}",
            self.round, self.submission_name, self.author_channel
        )
    }

    pub fn description(&self) -> String {
        format!(
            "Peer review of the manuscript {} by {}. The content is encrypted for \
             objectivity during the peer review process. The decryption key will be \
             published once the manuscript reaches the official publication stage.",
            self.submission_name, self.author_channel
        )
    }
}

/// Concatenate review bodies under numbered reviewer labels.
pub fn format_reviews<S: AsRef<str>>(bodies: &[S]) -> String {
    let mut text = String::from(BUNDLE_HEADER);
    for (i, body) in bodies.iter().enumerate() {
        text.push_str(&format!("*** REVIEWER {} ***\n\n", i + 1));
        text.push_str(body.as_ref());
        text.push_str("\n\n\n");
    }
    text.push_str(BUNDLE_FOOTER);
    text
}
