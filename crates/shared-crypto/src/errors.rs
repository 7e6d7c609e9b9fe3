//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Padding validation failed after decryption: the passphrase is wrong.
    #[error("Invalid password")]
    InvalidPassword,

    /// Ciphertext could not be parsed (bad base64, header or block length)
    #[error("Malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// Key derivation cost parameters are unusable
    #[error("Invalid key derivation parameters: n={n}, r={r}, p={p}")]
    InvalidCostParameters {
        /// CPU/memory cost
        n: u64,
        /// Block size
        r: u32,
        /// Parallelization
        p: u32,
    },

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Invalid signature encoding
    #[error("Invalid signature")]
    InvalidSignature,

    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Key could not be serialized or parsed
    #[error("Key encoding failed: {0}")]
    KeyEncoding(String),

    /// Reading key or document material failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
