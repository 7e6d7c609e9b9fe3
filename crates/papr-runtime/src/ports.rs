//! # Runtime Ports
//!
//! Capabilities the runtime needs beyond [`shared_types::LedgerClient`].

use async_trait::async_trait;
use shared_crypto::Secp256k1KeyPair;
use shared_types::LedgerError;

/// Access to the private keys of the wallet's own channels.
///
/// The review-server handshake derives its shared secret from the caller's
/// channel key, so the runtime needs the key itself, not just signatures.
#[async_trait]
pub trait ChannelKeys: Send + Sync {
    async fn channel_keypair(&self, channel_name: &str) -> Result<Secp256k1KeyPair, LedgerError>;
}
