//! webssh-client library crate.
//!
//! Opens one interactive remote-shell session through a WebSocket gateway and
//! hosts it in the local terminal.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! local terminal (stdin / stdout / window size)
//!         ↕
//! [webssh-client]
//!   ├── domain/           ClientConfig
//!   ├── application/      Session state machine, viewport bridge, dispatcher
//!   └── infrastructure/
//!         ├── ws_channel/  WebSocket transport channel (tokio-tungstenite)
//!         ├── terminal/    Render sink, viewport, raw mode, stdin, resize signal
//!         ├── timer/       Settle timer
//!         ├── config_file/ TOML config loading
//!         └── event_loop/  Single dispatch loop
//!         ↕
//! session gateway (JSON over WebSocket) → remote shell
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `webssh-core` only.  Everything it
//!   talks to (channels, the terminal, timers) is a trait it owns.
//! - `infrastructure` implements those traits with tokio, tungstenite and
//!   crossterm.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: session lifecycle, viewport bridge, event dispatch.
pub mod application;

/// Infrastructure layer: WebSocket transport, terminal adapters, event loop.
pub mod infrastructure;
