//! Article secrets: passphrases and the per-article RSA key pair.

use shared_crypto::{generate_passphrase, CryptoError, RsaKeyPair};
use zeroize::Zeroizing;

/// Secrets generated once when an article is created.
pub struct ArticleSecrets {
    /// Protects the private key
    pub review_passphrase: Zeroizing<String>,
    /// Present when the article starts out private
    pub encryption_passphrase: Option<Zeroizing<String>>,
    /// Public key PEM
    pub public_key_pem: String,
    /// Private key PEM inside a passphrase envelope
    pub encrypted_private_key: String,
}

/// Generate passphrases and a key pair. CPU heavy; run on a blocking thread.
pub fn generate_article_secrets(encrypt: bool) -> Result<ArticleSecrets, CryptoError> {
    let review_passphrase = generate_passphrase();
    let encryption_passphrase = encrypt.then(generate_passphrase);

    let keypair = RsaKeyPair::generate()?;
    let public_key_pem = keypair.public_key().to_pem()?;
    let encrypted_private_key = keypair.to_encrypted_pem(&review_passphrase)?;

    Ok(ArticleSecrets {
        review_passphrase,
        encryption_passphrase,
        public_key_pem,
        encrypted_private_key,
    })
}

/// Decrypt a review bundle addressed to the article key.
pub fn open_review_bundle(
    encrypted_private_key: &str,
    review_passphrase: &str,
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let keypair = RsaKeyPair::from_encrypted_pem(encrypted_private_key, review_passphrase)?;
    keypair.decrypt(ciphertext)
}
