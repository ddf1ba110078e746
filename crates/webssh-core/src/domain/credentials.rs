//! Host credentials for a single connect attempt.
//!
//! Credentials are ephemeral: they are collected once, moved into the session
//! state machine when the user connects, copied into the `connect` message,
//! and dropped.  Nothing here persists them.

use std::fmt;

use thiserror::Error;

/// Port used when the user does not specify one.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Errors produced while building [`Credentials`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    /// The port is outside `1..=65535`.
    #[error("port must be between 1 and 65535, got {0}")]
    PortOutOfRange(String),
}

/// Everything needed to ask the gateway for a remote shell.
///
/// `Debug` is implemented by hand so the password never ends up in a log line.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Builds credentials, rejecting port 0.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError::PortOutOfRange`] when `port` is 0.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CredentialsError> {
        if port == 0 {
            return Err(CredentialsError::PortOutOfRange(port.to_string()));
        }
        Ok(Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parses a port the way the connection form enters it: as text.
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`CredentialsError::PortOutOfRange`] for anything that is not an
/// integer in `1..=65535`.
pub fn parse_port(text: &str) -> Result<u16, CredentialsError> {
    match text.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(CredentialsError::PortOutOfRange(text.to_string())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
