//! # Passphrase Envelope
//!
//! Symmetric encryption keyed by a human secret.
//!
//! ## Format
//!
//! ```text
//! base64( "s:{n}:{r}:{p}:" || salt (16 bytes) || AES-256-CBC(PKCS#7, plaintext) )
//! ```
//!
//! The salt doubles as the CBC initialization vector. The scrypt cost
//! parameters travel with the ciphertext so old blobs stay decryptable if the
//! defaults ever change.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::CryptoError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Salt (and IV) length in bytes.
pub const SALT_LEN: usize = 16;

const KEY_LEN: usize = 32;
const BLOCK_LEN: usize = 16;
const SCHEME_TAG: &[u8] = b"s";

/// scrypt cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScryptCost {
    /// CPU/memory cost (power of two)
    pub n: u64,
    /// Block size
    pub r: u32,
    /// Parallelization
    pub p: u32,
}

impl ScryptCost {
    /// Fixed cost used for every new envelope.
    pub const DEFAULT: Self = Self {
        n: 8192,
        r: 16,
        p: 1,
    };

    fn params(&self) -> Result<scrypt::Params, CryptoError> {
        let invalid = || CryptoError::InvalidCostParameters {
            n: self.n,
            r: self.r,
            p: self.p,
        };

        if self.n < 2 || !self.n.is_power_of_two() {
            return Err(invalid());
        }
        let log_n = self.n.trailing_zeros() as u8;

        scrypt::Params::new(log_n, self.r, self.p, KEY_LEN).map_err(|_| invalid())
    }
}

impl Default for ScryptCost {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Derive the 256-bit AES key for `secret` and `salt`.
fn derive_key(
    secret: &[u8],
    salt: &[u8],
    cost: ScryptCost,
) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError> {
    let params = cost.params()?;
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    scrypt::scrypt(secret, salt, &params, &mut key[..])
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    Ok(key)
}

/// Encrypt `plaintext` under `secret` with the default cost.
///
/// # Errors
///
/// Returns `CryptoError::InvalidCostParameters` only if the defaults are
/// unusable, which would be a programming error.
pub fn encrypt(secret: impl AsRef<[u8]>, plaintext: &[u8]) -> Result<String, CryptoError> {
    encrypt_with_cost(secret, plaintext, ScryptCost::DEFAULT)
}

/// Encrypt `plaintext` under `secret` with explicit scrypt cost.
pub fn encrypt_with_cost(
    secret: impl AsRef<[u8]>,
    plaintext: &[u8],
    cost: ScryptCost,
) -> Result<String, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let key = derive_key(secret.as_ref(), &salt, cost)?;
    let ciphertext =
        Aes256CbcEnc::new(key.as_ref().into(), &salt.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let header = format!("s:{}:{}:{}:", cost.n, cost.r, cost.p);
    let mut blob = Vec::with_capacity(header.len() + SALT_LEN + ciphertext.len());
    blob.extend_from_slice(header.as_bytes());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&ciphertext);

    Ok(STANDARD.encode(blob))
}

/// Decrypt an envelope produced by [`encrypt`].
///
/// # Errors
///
/// - `CryptoError::InvalidPassword` when PKCS#7 padding validation fails
///
/// Padding is the only integrity check. A wrong secret still produces
/// valid padding about once in 256 attempts, and then garbage comes back
/// as `Ok`. Callers that must be certain verify the plaintext themselves,
/// e.g. by its file signature.
/// - `CryptoError::MalformedCiphertext` for any structural problem
/// - `CryptoError::InvalidCostParameters` for unusable header parameters
pub fn decrypt(secret: impl AsRef<[u8]>, envelope: &str) -> Result<Vec<u8>, CryptoError> {
    let data = STANDARD
        .decode(envelope.trim())
        .map_err(|e| CryptoError::MalformedCiphertext(format!("base64: {e}")))?;

    let mut fields = data.splitn(5, |b| *b == b':');
    let tag = fields.next().unwrap_or_default();
    if tag != SCHEME_TAG {
        return Err(CryptoError::MalformedCiphertext(
            "unknown scheme tag".to_string(),
        ));
    }

    let cost = ScryptCost {
        n: parse_field(fields.next(), "n")?,
        r: parse_field(fields.next(), "r")?,
        p: parse_field(fields.next(), "p")?,
    };

    let body = fields
        .next()
        .ok_or_else(|| CryptoError::MalformedCiphertext("missing payload".to_string()))?;
    if body.len() < SALT_LEN + BLOCK_LEN {
        return Err(CryptoError::MalformedCiphertext(
            "payload shorter than one block".to_string(),
        ));
    }

    let (salt, ciphertext) = body.split_at(SALT_LEN);
    if ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CryptoError::MalformedCiphertext(format!(
            "ciphertext length {} is not a multiple of {BLOCK_LEN}",
            ciphertext.len()
        )));
    }

    let key = derive_key(secret.as_ref(), salt, cost)?;
    let mut iv = [0u8; SALT_LEN];
    iv.copy_from_slice(salt);

    Aes256CbcDec::new(key.as_ref().into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::InvalidPassword)
}

fn parse_field<T: std::str::FromStr>(field: Option<&[u8]>, name: &str) -> Result<T, CryptoError> {
    field
        .and_then(|raw| std::str::from_utf8(raw).ok())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| CryptoError::MalformedCiphertext(format!("bad cost parameter {name}")))
}
