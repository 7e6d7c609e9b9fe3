//! # SHA-256 Helpers
//!
//! Digests used for review signing and document fingerprints.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::CryptoError;

/// SHA-256 output.
pub type Hash = [u8; 32];

/// Read size for streaming file digests.
pub const CHUNK_SIZE: usize = 4096;

/// One-shot SHA-256.
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// SHA-256 of a file, streamed in [`CHUNK_SIZE`] blocks.
pub fn file_sha256(path: &Path) -> Result<Hash, CryptoError> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hasher.finalize().into())
}

/// Digest a channel signs for a review:
/// `SHA-256(signing_ts || claim_hash || payload)`.
///
/// `claim_hash` is the channel's claim id in ledger byte order.
pub fn signable_digest(signing_ts: &str, claim_hash: &[u8], payload: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(signing_ts.as_bytes());
    hasher.update(claim_hash);
    hasher.update(payload);
    hasher.finalize().into()
}
