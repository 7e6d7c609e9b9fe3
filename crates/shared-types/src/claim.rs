//! # Claim Naming
//!
//! Claim names are part of the wire contract: the ledger and the review
//! server both locate artifacts by them.
//!
//! | reviewed | revision | claim name |
//! |----------|----------|------------|
//! | false | 0 | `{base}_preprint` |
//! | false | n > 0 | `{base}_r{n}` |
//! | true | n | `{base}_v{n}` |

use thiserror::Error;

/// Rejected base claim names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimNameError {
    /// Empty base name.
    #[error("claim name is empty")]
    Empty,
    /// Character the ledger reserves for URLs or channels.
    #[error("claim name {name:?} contains reserved character {ch:?}")]
    ReservedCharacter {
        /// Offending name
        name: String,
        /// Offending character
        ch: char,
    },
}

const RESERVED: &[char] = &[':', '#', '@', '/', '$', '*', '?', '&', '=', '%'];

/// Claim name of a manuscript revision.
pub fn derive_claim_name(base: &str, reviewed: bool, revision: u32) -> String {
    match (reviewed, revision) {
        (false, 0) => format!("{base}_preprint"),
        (false, n) => format!("{base}_r{n}"),
        (true, n) => format!("{base}_v{n}"),
    }
}

/// Claim name of review round `round` for `submission`.
pub fn review_claim_name(submission: &str, round: u32) -> String {
    format!("{submission}_review{round}")
}

/// Check a human-chosen base claim name.
pub fn validate_base_claim_name(name: &str) -> Result<(), ClaimNameError> {
    if name.is_empty() {
        return Err(ClaimNameError::Empty);
    }

    if let Some(ch) = name
        .chars()
        .find(|c| c.is_whitespace() || RESERVED.contains(c))
    {
        return Err(ClaimNameError::ReservedCharacter {
            name: name.to_string(),
            ch,
        });
    }

    Ok(())
}
