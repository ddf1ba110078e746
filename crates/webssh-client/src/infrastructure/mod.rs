//! Infrastructure layer for webssh-client.
//!
//! All I/O lives here: the WebSocket channel tasks, the local terminal, the
//! settle timer and the configuration file.
//!
//! # Responsibilities
//!
//! - Opening WebSocket channels to the gateway and reporting their events
//! - Writing remote output to stdout and measuring the terminal
//! - Reading stdin and watching for window-size changes
//! - Running the one-shot settle timer
//! - Loading and validating the TOML configuration file
//! - Draining the event queue into the client
//!
//! # What does NOT belong here?
//!
//! - Session state transitions (that is the application layer)
//! - Message encoding (that is `webssh-core`)

pub mod config_file;
pub mod event_loop;
pub mod terminal;
pub mod timer;
pub mod ws_channel;

pub use config_file::{load_config, ConfigError, ConfigFile};
pub use event_loop::{drive, run_until};
pub use terminal::{
    spawn_resize_watcher, spawn_stdin_reader, RawModeGuard, StdoutSink, TerminalViewport,
};
pub use timer::TokioSettleTimer;
pub use ws_channel::WebSocketTransport;
