//! # Adapters
//!
//! - `lbry`: wallet daemon JSON-RPC client (ledger + channel keys)
//! - `review_server`: review-server gateway over authenticated sessions
//! - `keys`: in-memory channel keys

pub mod keys;
pub mod lbry;
pub mod review_server;

pub use keys::StaticChannelKeys;
pub use lbry::LbryDaemonClient;
pub use review_server::SessionGateway;
