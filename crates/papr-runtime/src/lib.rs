//! # Papr Runtime
//!
//! Composition root of the Papr subsystems.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, TOML file, `PAPR_*` environment)
//! 2. Install the log subscriber
//! 3. Open the local store and connect the wallet daemon
//! 4. Dispatch one command through the [`CommandRegistry`]
//!
//! ## Module Structure
//!
//! - `config` - layered configuration
//! - `adapters/` - wallet daemon, review-server gateway, static channel keys
//! - `context` - service wiring
//! - `handlers/` - command implementations
//! - `registry` - command name to handler table

pub mod adapters;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod ports;
pub mod registry;

pub use config::{ConfigError, PaprConfig};
pub use context::{ContextParts, PaprContext};
pub use error::CommandError;
pub use ports::ChannelKeys;
pub use registry::CommandRegistry;
