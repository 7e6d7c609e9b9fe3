//! # Hybrid Envelope (RSA-OAEP + AES-256-GCM)
//!
//! Review bundles are encrypted for an author who only published a public
//! key. Small payloads go straight into RSA-OAEP (SHA-256 for both the hash
//! and MGF1). Payloads above the OAEP limit wrap a fresh AES-256-GCM key:
//!
//! ```text
//! direct: RSA-OAEP(plaintext)                               (k bytes)
//! hybrid: RSA-OAEP(aes_key) || nonce (12) || AES-GCM(plaintext)
//! ```
//!
//! The two forms are told apart by length alone: a direct ciphertext is
//! exactly one modulus long.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm,
};
use rsa::{
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding},
    traits::PublicKeyParts,
    Oaep, RsaPrivateKey, RsaPublicKey,
};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::{passphrase, CryptoError};

/// Modulus size for article key pairs.
pub const RSA_KEY_BITS: usize = 2048;

const NONCE_LEN: usize = 12;
const SHA256_LEN: usize = 32;

/// Largest plaintext RSA-OAEP(SHA-256) takes for a modulus of `k` bytes.
fn oaep_limit(k: usize) -> usize {
    k.saturating_sub(2 * SHA256_LEN + 2)
}

/// An article's RSA key pair.
#[derive(Clone)]
pub struct RsaKeyPair {
    private: RsaPrivateKey,
}

impl RsaKeyPair {
    /// Generate a fresh 2048-bit key pair. Slow; call off the async runtime.
    pub fn generate() -> Result<Self, CryptoError> {
        let private = RsaPrivateKey::new(&mut rand::thread_rng(), RSA_KEY_BITS)
            .map_err(|e| CryptoError::KeyGenerationFailed(e.to_string()))?;
        Ok(Self { private })
    }

    /// Public half.
    pub fn public_key(&self) -> RsaPublicKeyPem {
        RsaPublicKeyPem {
            key: self.private.to_public_key(),
        }
    }

    /// PKCS#8 PEM of the private key, wrapped in a passphrase envelope.
    pub fn to_encrypted_pem(&self, passphrase: &str) -> Result<String, CryptoError> {
        let pem = self
            .private
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyEncoding(e.to_string()))?;
        passphrase::encrypt(passphrase, pem.as_bytes())
    }

    /// Inverse of [`RsaKeyPair::to_encrypted_pem`].
    ///
    /// # Errors
    ///
    /// `CryptoError::InvalidPassword` if `passphrase` is wrong.
    pub fn from_encrypted_pem(encrypted: &str, passphrase: &str) -> Result<Self, CryptoError> {
        let pem = Zeroizing::new(passphrase::decrypt(passphrase, encrypted)?);
        let pem = std::str::from_utf8(&pem).map_err(|_| CryptoError::InvalidPrivateKey)?;
        let private =
            RsaPrivateKey::from_pkcs8_pem(pem).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { private })
    }

    /// Decrypt a direct or hybrid ciphertext addressed to this key.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let k = self.private.size();
        if ciphertext.len() == k {
            return self
                .private
                .decrypt(Oaep::new::<Sha256>(), ciphertext)
                .map_err(|e| CryptoError::DecryptionFailed(e.to_string()));
        }

        if ciphertext.len() < k + NONCE_LEN {
            return Err(CryptoError::MalformedCiphertext(format!(
                "hybrid ciphertext too short: {} bytes",
                ciphertext.len()
            )));
        }

        let (wrapped, rest) = ciphertext.split_at(k);
        let (nonce, body) = rest.split_at(NONCE_LEN);

        let key_bytes = Zeroizing::new(
            self.private
                .decrypt(Oaep::new::<Sha256>(), wrapped)
                .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?,
        );
        let cipher = Aes256Gcm::new_from_slice(&key_bytes)
            .map_err(|_| CryptoError::DecryptionFailed("bad wrapped key length".to_string()))?;

        cipher
            .decrypt(nonce.into(), body)
            .map_err(|_| CryptoError::DecryptionFailed("authentication tag mismatch".to_string()))
    }
}

impl std::fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeyPair").finish_non_exhaustive()
    }
}

/// RSA public key, exchanged as SubjectPublicKeyInfo PEM.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaPublicKeyPem {
    key: RsaPublicKey,
}

impl RsaPublicKeyPem {
    /// Parse a `-----BEGIN PUBLIC KEY-----` block.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let key = RsaPublicKey::from_public_key_pem(pem.trim())
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self { key })
    }

    /// Encode as PEM.
    pub fn to_pem(&self) -> Result<String, CryptoError> {
        self.key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyEncoding(e.to_string()))
    }

    /// Encrypt `plaintext` for the holder of the matching private key.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut rng = rand::thread_rng();
        let k = self.key.size();

        if plaintext.len() <= oaep_limit(k) {
            return self
                .key
                .encrypt(&mut rng, Oaep::new::<Sha256>(), plaintext)
                .map_err(|e| CryptoError::EncryptionFailed(e.to_string()));
        }

        let aes_key = Aes256Gcm::generate_key(OsRng);
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let body = Aes256Gcm::new(&aes_key)
            .encrypt(&nonce, plaintext)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        let wrapped = self
            .key
            .encrypt(&mut rng, Oaep::new::<Sha256>(), aes_key.as_slice())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let mut out = Vec::with_capacity(wrapped.len() + NONCE_LEN + body.len());
        out.extend_from_slice(&wrapped);
        out.extend_from_slice(nonce.as_slice());
        out.extend_from_slice(&body);
        Ok(out)
    }
}
