//! # Shared Crypto - Confidentiality Envelope Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `passphrase` | scrypt + AES-256-CBC | Manuscript bundles, tokens, private keys at rest |
//! | `hybrid` | RSA-2048 OAEP(SHA-256) + AES-256-GCM | Review bundles for the author |
//! | `ecdsa` | secp256k1 | Review signatures, server handshake (ECDH) |
//! | `hashing` | SHA-256 | Signable digests, file fingerprints |
//! | `wordlist` | - | Human-readable article passphrases |
//!
//! ## Security Properties
//!
//! - **Passphrase envelope**: memory-hard key derivation, wrong passphrase
//!   surfaces as `CryptoError::InvalidPassword`
//! - **Hybrid envelope**: payloads past the OAEP limit are sealed with a
//!   fresh AEAD key, so tampering is detected
//! - **secp256k1**: RFC 6979 deterministic nonces, low-S normalized verify

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod hybrid;
pub mod passphrase;
pub mod wordlist;

// Re-exports
pub use ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey, Secp256k1Signature};
pub use errors::CryptoError;
pub use hashing::{file_sha256, sha256, signable_digest, Hash};
pub use hybrid::{RsaKeyPair, RsaPublicKeyPem};
pub use passphrase::ScryptCost;
pub use wordlist::generate_passphrase;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
