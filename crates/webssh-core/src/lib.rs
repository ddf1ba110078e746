//! # webssh-core
//!
//! Shared library for webssh containing the session wire protocol, its JSON
//! codec, and the small set of domain types both sides of a session agree on.
//!
//! It has zero dependencies on async runtimes, terminals, or network sockets.
//!
//! # Architecture overview
//!
//! webssh opens an interactive remote shell through a WebSocket gateway.  The
//! client sends credentials, keystrokes and its terminal size; the gateway
//! streams shell output back.  Every frame on the wire is one JSON object with
//! a `"type"` discriminant.
//!
//! - **`protocol`** – The message vocabulary (`connect`, `input`, `resize`,
//!   `output`, `connected`, `error`) and the codec that turns messages into
//!   frames and frames back into messages.
//!
//! - **`domain`** – Pure value types: [`Credentials`] collected from the user
//!   and [`ViewportSize`], the terminal surface measured in character cells.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `webssh_core::Message` instead of `webssh_core::protocol::messages::Message`.
pub use domain::credentials::{parse_port, Credentials, CredentialsError, DEFAULT_SSH_PORT};
pub use domain::viewport::{ViewportError, ViewportSize};
pub use protocol::codec::{decode_message, encode_message, ProtocolError};
pub use protocol::messages::{Direction, Message, MessageTag};
