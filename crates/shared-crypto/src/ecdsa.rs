//! # ECDSA Signatures and Key Agreement (secp256k1)
//!
//! Channel identities on the ledger are secp256k1 key pairs. They are used
//! two ways:
//!
//! - **Prehash ECDSA**: reviews are signed over a SHA-256 digest that the
//!   caller has already built (see [`crate::hashing::signable_digest`]).
//! - **ECDH**: the review-server handshake derives a shared secret as
//!   `SHA-256(compressed(d · Q))`.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces
//! - Low-S normalization on verify, so high-S signatures from other
//!   signers are still accepted

use k256::{
    ecdsa::{
        signature::hazmat::{PrehashSigner, PrehashVerifier},
        Signature, SigningKey, VerifyingKey,
    },
    elliptic_curve::sec1::ToEncodedPoint,
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey, LineEnding},
    AffinePoint, PublicKey, Scalar, SecretKey,
};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use crate::CryptoError;

/// secp256k1 public key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Secp256k1PublicKey {
    key: VerifyingKey,
}

impl Secp256k1PublicKey {
    /// Create from compressed bytes (33 bytes, starting with 0x02 or 0x03).
    pub fn from_bytes(bytes: [u8; 33]) -> Result<Self, CryptoError> {
        Self::from_sec1(&bytes)
    }

    /// Parse SEC1 bytes (compressed or uncompressed).
    pub fn from_sec1(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key = VerifyingKey::from_sec1_bytes(bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self { key })
    }

    /// Parse a DER-encoded SubjectPublicKeyInfo.
    pub fn from_der(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key =
            VerifyingKey::from_public_key_der(bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self { key })
    }

    /// Parse whichever encoding the bytes are in. Ledger channels publish
    /// DER; handshake responses carry SEC1.
    pub fn parse(bytes: &[u8]) -> Result<Self, CryptoError> {
        Self::from_sec1(bytes).or_else(|_| Self::from_der(bytes))
    }

    /// Compressed SEC1 bytes.
    pub fn to_compressed(&self) -> [u8; 33] {
        let point = self.key.to_encoded_point(true);
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(point.as_bytes());
        bytes
    }

    /// DER SubjectPublicKeyInfo, the encoding channels publish.
    pub fn to_der(&self) -> Result<Vec<u8>, CryptoError> {
        self.key
            .to_public_key_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| CryptoError::KeyEncoding(e.to_string()))
    }

    /// Verify `signature` over an already-hashed `digest`.
    ///
    /// Returns `false` for any signature that does not check out.
    pub fn verify_prehash(&self, digest: &[u8; 32], signature: &Secp256k1Signature) -> bool {
        let Ok(sig) = Signature::from_slice(&signature.0) else {
            return false;
        };
        let sig = sig.normalize_s().unwrap_or(sig);

        self.key.verify_prehash(digest, &sig).is_ok()
    }

    fn to_public_key(self) -> PublicKey {
        PublicKey::from(&self.key)
    }
}

/// ECDSA signature (64 bytes, r||s format).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Secp256k1Signature([u8; 64]);

impl Secp256k1Signature {
    /// Create from bytes (64 bytes).
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, rejecting anything but 64 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; 64] = bytes.try_into().map_err(|_| CryptoError::InvalidSignature)?;
        Ok(Self(bytes))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// secp256k1 key pair backing a channel identity.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Parse a SEC1 (`EC PRIVATE KEY`) or PKCS#8 PEM private key, the form
    /// wallets export channel keys in.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_sec1_pem(pem)
            .or_else(|_| SecretKey::from_pkcs8_pem(pem))
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self {
            signing_key: SigningKey::from(secret),
        })
    }

    /// SEC1 PEM encoding of the private key.
    pub fn to_pem(&self) -> Result<Zeroizing<String>, CryptoError> {
        SecretKey::from_bytes(&self.signing_key.to_bytes())
            .map_err(|_| CryptoError::InvalidPrivateKey)?
            .to_sec1_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyEncoding(e.to_string()))
    }

    /// Public half.
    pub fn public_key(&self) -> Secp256k1PublicKey {
        Secp256k1PublicKey {
            key: *self.signing_key.verifying_key(),
        }
    }

    /// Sign a 32-byte digest (deterministic RFC 6979).
    pub fn sign_prehash(&self, digest: &[u8; 32]) -> Result<Secp256k1Signature, CryptoError> {
        let sig: Signature = self
            .signing_key
            .sign_prehash(digest)
            .map_err(|_| CryptoError::InvalidSignature)?;
        let bytes: [u8; 64] = sig.to_bytes().into();
        Ok(Secp256k1Signature(bytes))
    }

    /// ECDH shared secret with `peer`: SHA-256 of the compressed shared point.
    pub fn shared_secret(&self, peer: &Secp256k1PublicKey) -> Zeroizing<[u8; 32]> {
        let scalar: Scalar = **self.signing_key.as_nonzero_scalar();
        let shared = AffinePoint::from(peer.to_public_key().to_projective() * scalar);
        let encoded = shared.to_encoded_point(true);

        Zeroizing::new(Sha256::digest(encoded.as_bytes()).into())
    }

    /// Get secret key bytes (for serialization).
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes().into())
    }
}

impl Clone for Secp256k1KeyPair {
    fn clone(&self) -> Self {
        Self {
            signing_key: self.signing_key.clone(),
        }
    }
}

impl Drop for Secp256k1KeyPair {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

impl std::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}
