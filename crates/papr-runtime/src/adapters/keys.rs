use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_crypto::Secp256k1KeyPair;
use shared_types::LedgerError;

use crate::ports::ChannelKeys;

/// Channel keys held in memory, for tests and offline runs.
#[derive(Default)]
pub struct StaticChannelKeys {
    keys: RwLock<HashMap<String, Secp256k1KeyPair>>,
}

impl StaticChannelKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, channel_name: &str, keypair: Secp256k1KeyPair) {
        self.keys.write().insert(channel_name.to_string(), keypair);
    }
}

#[async_trait]
impl ChannelKeys for StaticChannelKeys {
    async fn channel_keypair(&self, channel_name: &str) -> Result<Secp256k1KeyPair, LedgerError> {
        self.keys
            .read()
            .get(channel_name)
            .cloned()
            .ok_or_else(|| LedgerError::ChannelNotFound {
                channel: channel_name.to_string(),
            })
    }
}
