//! Session state per (caller channel, server).
//!
//! ```text
//! NoSession ──handshake──► TokenObtained ──401──► refresh ──► TokenObtained
//!                                                    │
//!                                                    └─401 again──► Failed
//! ```
//!
//! A new request from `Failed` starts over with a handshake.

use std::fmt;

use zeroize::Zeroizing;

/// Tokens delivered by a handshake.
#[derive(Clone)]
pub struct SessionTokens {
    /// Bearer token
    pub access: Zeroizing<String>,
    /// Refresh token
    pub refresh: Zeroizing<String>,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionTokens { .. }")
    }
}

/// Where a session stands.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// No handshake yet
    #[default]
    NoSession,
    /// Usable tokens from handshake number `generation`
    TokenObtained {
        /// Tokens
        tokens: SessionTokens,
        /// Handshake that produced them
        generation: u64,
    },
    /// Rejected even after a fresh handshake
    Failed,
}

impl SessionState {
    /// Access token and its generation, if any.
    pub fn token(&self) -> Option<(Zeroizing<String>, u64)> {
        match self {
            Self::TokenObtained { tokens, generation } => {
                Some((tokens.access.clone(), *generation))
            }
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}
