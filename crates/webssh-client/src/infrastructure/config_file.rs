//! Optional TOML configuration file.
//!
//! ```toml
//! [session]
//! endpoint = "wss://gateway.example.com/ws"
//! settle_delay_ms = 100
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every key is optional.  Missing keys take the same defaults as
//! [`ClientConfig::default`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::config::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_SETTLE_DELAY};

/// Error type for loading and validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The endpoint is not a WebSocket URL.
    #[error("endpoint must start with ws:// or wss://, got {0:?}")]
    InvalidEndpoint(String),
}

// ── Schema ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SessionSection {
    /// WebSocket URL of the gateway.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Delay before the settling resize, in milliseconds.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingSection {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY.as_millis() as u64
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ConfigFile {
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `text` is not valid TOML for this
    /// schema.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Converts the file into a validated [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] if the endpoint is not a
    /// WebSocket URL.
    pub fn into_client_config(self) -> Result<ClientConfig, ConfigError> {
        validate_endpoint(&self.session.endpoint)?;
        Ok(ClientConfig {
            endpoint: self.session.endpoint,
            settle_delay: Duration::from_millis(self.session.settle_delay_ms),
            log_level: self.logging.level,
        })
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Reads and parses the file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read (including when it
/// does not exist, since the path was given explicitly) and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ConfigFile::parse(&content)
}

/// # Errors
///
/// Returns [`ConfigError::InvalidEndpoint`] unless `endpoint` starts with
/// `ws://` or `wss://` and names something after the scheme.
pub fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    let rest = endpoint
        .strip_prefix("ws://")
        .or_else(|| endpoint.strip_prefix("wss://"));
    match rest {
        Some(rest) if !rest.is_empty() => Ok(()),
        _ => Err(ConfigError::InvalidEndpoint(endpoint.to_string())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
