//! # Runtime Configuration
//!
//! Built in three layers, later ones winning:
//!
//! 1. `Default`
//! 2. optional TOML file
//! 3. `PAPR_*` environment variables
//!
//! ```toml
//! [paths]
//! submission_dir = "/var/lib/papr/submissions"
//! review_dir = "/var/lib/papr/reviews"
//! database_path = "/var/lib/papr/papr.db"
//!
//! [ledger]
//! daemon_url = "http://localhost:5279/"
//! default_bid = "0.0001"
//!
//! [session]
//! request_timeout_secs = 30
//! connect_timeout_secs = 5
//!
//! [logging]
//! level = "info"
//! json = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaprConfig {
    pub paths: PathsConfig,
    pub ledger: LedgerConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// Filesystem locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Bundles and article key files
    pub submission_dir: PathBuf,
    /// Sealed review bundles
    pub review_dir: PathBuf,
    /// Local store file
    pub database_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            submission_dir: PathBuf::from("submissions"),
            review_dir: PathBuf::from("reviews"),
            database_path: PathBuf::from("papr.db"),
        }
    }
}

/// Ledger daemon connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint of the wallet daemon
    pub daemon_url: String,
    /// Bid for every published claim
    pub default_bid: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            daemon_url: "http://localhost:5279/".to_string(),
            default_bid: "0.0001".to_string(),
        }
    }
}

/// Review-server HTTP settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 5,
        }
    }
}

impl SessionConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Log output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `papr_runtime=debug`
    pub level: String,
    /// One JSON object per line instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl PaprConfig {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file. Missing sections and keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply overrides from `lookup`.
    ///
    /// # Environment Variables
    ///
    /// - `PAPR_SUBMISSION_DIR`, `PAPR_REVIEW_DIR`, `PAPR_DATABASE`
    /// - `PAPR_DAEMON_URL`
    /// - `PAPR_LOG_LEVEL`, falling back to `RUST_LOG`
    /// - `PAPR_JSON_LOGS` (`true`/`1`)
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("PAPR_SUBMISSION_DIR") {
            self.paths.submission_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("PAPR_REVIEW_DIR") {
            self.paths.review_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("PAPR_DATABASE") {
            self.paths.database_path = PathBuf::from(path);
        }
        if let Some(url) = lookup("PAPR_DAEMON_URL") {
            self.ledger.daemon_url = url;
        }
        if let Some(level) = lookup("PAPR_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            self.logging.level = level;
        }
        if let Some(json) = lookup("PAPR_JSON_LOGS") {
            self.logging.json = json.eq_ignore_ascii_case("true") || json == "1";
        }
    }

    /// Reject settings no command could work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let paths = [
            ("paths.submission_dir", &self.paths.submission_dir),
            ("paths.review_dir", &self.paths.review_dir),
            ("paths.database_path", &self.paths.database_path),
        ];
        for (name, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} is empty")));
            }
        }

        let url = &self.ledger.daemon_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "ledger.daemon_url {url} is not an http(s) URL"
            )));
        }
        if self.ledger.default_bid.trim().is_empty() {
            return Err(ConfigError::Invalid("ledger.default_bid is empty".into()));
        }
        if self.session.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "session.request_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}
