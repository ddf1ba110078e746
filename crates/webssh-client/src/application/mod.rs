//! Application layer for webssh-client.
//!
//! Knows *what* a session does; the infrastructure layer supplies *how*.
//!
//! # Responsibilities
//!
//! - **`session`** – The session lifecycle state machine.  Owns the one
//!   current channel, drives the `connect` handshake and routes decoded
//!   inbound messages to the render sink.  Also defines the traits the
//!   infrastructure implements: [`Transport`], [`Channel`], [`RenderSink`].
//!
//! - **`viewport_bridge`** – Turns local input into `input` messages and
//!   viewport measurements into `resize` messages.
//!
//! - **`terminal_client`** – The single dispatch point: one closed event enum,
//!   handled one event at a time.
//!
//! - **`diagnostics`** – The colored status lines written into the terminal.
//!
//! # What does NOT belong here?
//!
//! - Sockets, tasks or timers (infrastructure)
//! - Terminal modes and stdin/stdout handles (infrastructure)

pub mod diagnostics;
pub mod session;
pub mod terminal_client;
pub mod viewport_bridge;

#[cfg(test)]
pub(crate) mod testing;

pub use session::{
    Channel, ChannelEvent, ChannelId, Outcome, RenderSink, SessionError, SessionLifecycle,
    SessionState, Transport, TransportError,
};
pub use terminal_client::{ClientEvent, SettleTimer, TerminalClient};
pub use viewport_bridge::{Viewport, ViewportBridge};
