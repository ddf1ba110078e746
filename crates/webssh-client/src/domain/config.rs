//! Client configuration types.
//!
//! [`ClientConfig`] is the single source of truth for runtime settings.  It is
//! built from defaults, then overlaid with the optional TOML file and finally
//! with CLI arguments.

use std::time::Duration;

/// Gateway endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:5000/ws";

/// Delay between the session becoming active and the settling resize.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// All runtime configuration for the client.
///
/// # Example
///
/// ```rust
/// use webssh_client::domain::ClientConfig;
///
/// let cfg = ClientConfig::default();
/// assert_eq!(cfg.endpoint, "ws://localhost:5000/ws");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket URL of the session gateway.  Every session uses this one
    /// endpoint; there is no per-session routing.
    pub endpoint: String,

    /// How long after activation the settling resize fires.
    ///
    /// The first size report can race the surface's own layout, so a second
    /// one is sent once layout has had time to settle.
    pub settle_delay: Duration,

    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for ClientConfig {
    /// | Field        | Default                  |
    /// |--------------|--------------------------|
    /// | endpoint     | `ws://localhost:5000/ws` |
    /// | settle_delay | 100 ms                   |
    /// | log_level    | `warn`                   |
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            log_level: "warn".to_string(),
        }
    }
}
