//! JSON codec for encoding and decoding session protocol messages.
//!
//! Wire format: one UTF-8 JSON object per transport frame, discriminated by
//! its `"type"` field.  See [`crate::protocol::messages`] for the vocabulary.
//!
//! Decoding is done in two steps so failures can be told apart:
//!
//! 1. Parse the frame as a generic JSON value and read the `"type"` string.
//! 2. Only if the tag is known, parse the payload for that tag.
//!
//! A frame with an unrecognized tag therefore fails with
//! [`ProtocolError::UnknownTag`], distinct from a known tag whose payload is
//! missing a required field ([`ProtocolError::MalformedPayload`]).  Callers
//! decide what each means; the session state machine ignores both.

use serde_json::Value;
use thiserror::Error;

use crate::protocol::messages::{Message, MessageTag};

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The frame is not valid JSON.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// The frame is JSON but has no string `"type"` field.
    #[error("frame has no \"type\" field")]
    MissingTag,

    /// The `"type"` field names a message this codec does not know.
    #[error("unknown message type: {0:?}")]
    UnknownTag(String),

    /// The tag is known but a required field is missing or has the wrong type.
    #[error("malformed {tag} payload: {detail}")]
    MalformedPayload { tag: MessageTag, detail: String },

    /// An outbound message violates its schema and was not encoded.
    #[error("invalid {tag} field: {detail}")]
    InvalidField { tag: MessageTag, detail: String },
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`Message`] into one frame.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidField`] if the message breaks its schema:
/// a `resize` with a zero dimension or a `connect` with port 0.
///
/// # Examples
///
/// ```rust
/// use webssh_core::protocol::{decode_message, encode_message, Message};
///
/// let msg = Message::input("ls\n");
/// let frame = encode_message(&msg).unwrap();
/// assert_eq!(decode_message(&frame).unwrap(), msg);
/// ```
pub fn encode_message(msg: &Message) -> Result<Vec<u8>, ProtocolError> {
    validate_outgoing(msg)?;
    serde_json::to_vec(msg).map_err(|e| ProtocolError::InvalidField {
        tag: msg.tag(),
        detail: e.to_string(),
    })
}

/// Decodes one frame into a [`Message`].
///
/// Unknown extra fields are ignored so gateways may add informational fields.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the frame is not a JSON object with a known
/// `"type"` and the fields that type requires.
///
/// # Examples
///
/// ```rust
/// use webssh_core::protocol::{decode_message, Message, ProtocolError};
///
/// let msg = decode_message(br#"{"type":"error","error":"auth failed"}"#).unwrap();
/// assert_eq!(msg, Message::Error { error: "auth failed".to_string() });
///
/// let unknown = decode_message(br#"{"type":"ping"}"#);
/// assert_eq!(unknown, Err(ProtocolError::UnknownTag("ping".to_string())));
/// ```
pub fn decode_message(frame: &[u8]) -> Result<Message, ProtocolError> {
    let value: Value =
        serde_json::from_slice(frame).map_err(|e| ProtocolError::MalformedFrame(e.to_string()))?;

    let tag = match value.get("type").and_then(Value::as_str) {
        Some(text) => match MessageTag::from_wire(text) {
            Some(tag) => tag,
            None => return Err(ProtocolError::UnknownTag(text.to_string())),
        },
        None => return Err(ProtocolError::MissingTag),
    };

    serde_json::from_value(value).map_err(|e| ProtocolError::MalformedPayload {
        tag,
        detail: e.to_string(),
    })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn validate_outgoing(msg: &Message) -> Result<(), ProtocolError> {
    match msg {
        Message::Resize { cols, rows } if *cols == 0 || *rows == 0 => {
            Err(ProtocolError::InvalidField {
                tag: MessageTag::Resize,
                detail: format!("size must be at least 1x1, got {cols}x{rows}"),
            })
        }
        Message::Connect { port: 0, .. } => Err(ProtocolError::InvalidField {
            tag: MessageTag::Connect,
            detail: "port must be between 1 and 65535".to_string(),
        }),
        _ => Ok(()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
