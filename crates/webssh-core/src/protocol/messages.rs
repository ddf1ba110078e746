//! Message types for the session wire protocol.
//!
//! Every frame is a JSON object whose `"type"` field names the variant; all
//! other fields sit flat in the same object:
//!
//! ```json
//! {"type":"connect","host":"example.com","port":"22","username":"alice","password":"x"}
//! {"type":"input","data":"ls\n"}
//! {"type":"resize","cols":100,"rows":40}
//! {"type":"output","data":"\u001b[32mtotal 0\u001b[0m\r\n"}
//! {"type":"connected","message":"SSH connection established"}
//! {"type":"error","error":"auth failed"}
//! ```
//!
//! # Direction
//!
//! Direction is fixed per tag.  The client only ever sends `connect`, `input`
//! and `resize`; the gateway only ever sends `output`, `connected` and
//! `error`.  All six live in one enum so the codec is total over the whole
//! vocabulary, and [`MessageTag::direction`] tells the receiver which ones it
//! should act on.

use serde::{Deserialize, Serialize};

use crate::domain::credentials::Credentials;
use crate::domain::viewport::ViewportSize;

/// Which side of the session produces a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Client → gateway.
    Outbound,
    /// Gateway → client.
    Inbound,
}

/// The `"type"` discriminant of a [`Message`], without its payload.
///
/// Used for logging (a tag never carries secrets) and for classifying frames
/// before their payload is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageTag {
    Connect,
    Input,
    Resize,
    Output,
    Connected,
    Error,
}

impl MessageTag {
    /// Every tag, in wire-table order.
    pub const ALL: [MessageTag; 6] = [
        MessageTag::Connect,
        MessageTag::Input,
        MessageTag::Resize,
        MessageTag::Output,
        MessageTag::Connected,
        MessageTag::Error,
    ];

    /// The literal used in the `"type"` field.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageTag::Connect => "connect",
            MessageTag::Input => "input",
            MessageTag::Resize => "resize",
            MessageTag::Output => "output",
            MessageTag::Connected => "connected",
            MessageTag::Error => "error",
        }
    }

    /// Looks up a tag by its wire literal.  Matching is exact (case-sensitive).
    pub fn from_wire(text: &str) -> Option<MessageTag> {
        MessageTag::ALL.into_iter().find(|tag| tag.as_str() == text)
    }

    pub fn direction(self) -> Direction {
        match self {
            MessageTag::Connect | MessageTag::Input | MessageTag::Resize => Direction::Outbound,
            MessageTag::Output | MessageTag::Connected | MessageTag::Error => Direction::Inbound,
        }
    }
}

impl std::fmt::Display for MessageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One protocol message.  Immutable once built.
///
/// The derived `Debug` prints every field, including the `connect` password.
/// Log [`Message::tag`] instead of the message itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// Asks the gateway to open a shell on `host:port` as `username`.
    ///
    /// Must be the first message on a freshly opened channel.
    Connect {
        host: String,
        /// Sent as a decimal string, which is what the gateway parses.  Both
        /// strings and integers are accepted on decode.
        #[serde(with = "port_field")]
        port: u16,
        username: String,
        password: String,
    },

    /// Raw bytes typed or pasted into the local terminal, as text.
    Input { data: String },

    /// The local terminal surface changed size.
    Resize { cols: u16, rows: u16 },

    /// Raw shell output, escape sequences included.  Written verbatim.
    Output { data: String },

    /// The gateway reached the remote shell; the session is live.
    Connected {
        /// Informational text some gateways attach; never required.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// The gateway could not open or keep the shell.  `error` is human-readable.
    Error { error: String },
}

impl Message {
    /// Builds the `connect` message for a set of credentials.
    pub fn connect(credentials: &Credentials) -> Self {
        Message::Connect {
            host: credentials.host.clone(),
            port: credentials.port,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        }
    }

    pub fn input(data: impl Into<String>) -> Self {
        Message::Input { data: data.into() }
    }

    pub fn resize(size: ViewportSize) -> Self {
        Message::Resize {
            cols: size.cols(),
            rows: size.rows(),
        }
    }

    pub fn tag(&self) -> MessageTag {
        match self {
            Message::Connect { .. } => MessageTag::Connect,
            Message::Input { .. } => MessageTag::Input,
            Message::Resize { .. } => MessageTag::Resize,
            Message::Output { .. } => MessageTag::Output,
            Message::Connected { .. } => MessageTag::Connected,
            Message::Error { .. } => MessageTag::Error,
        }
    }

    pub fn direction(&self) -> Direction {
        self.tag().direction()
    }
}

/// Serde adapter for `connect.port`: written as a string, read from either.
mod port_field {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(port: &u16, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(port)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u16),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(port) => Ok(port),
            Repr::Text(text) => text
                .trim()
                .parse::<u16>()
                .map_err(|_| D::Error::custom(format!("invalid port '{text}'"))),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_serializes_port_as_string() {
        // Arrange
        let creds = Credentials::new("example.com", 22, "alice", "x").unwrap();

        // Act
        let json = serde_json::to_string(&Message::connect(&creds)).unwrap();

        // Assert: the gateway reads `port` as a string
        assert!(json.contains(r#""type":"connect""#));
        assert!(json.contains(r#""port":"22""#));
        assert!(json.contains(r#""host":"example.com""#));
    }

    #[test]
    fn test_connect_deserializes_integer_port() {
        let json = r#"{"type":"connect","host":"h","port":2222,"username":"u","password":"p"}"#;

        let msg: Message = serde_json::from_str(json).unwrap();

        match msg {
            Message::Connect { port, .. } => assert_eq!(port, 2222),
            other => panic!("expected Connect, got {:?}", other.tag()),
        }
    }

    #[test]
    fn test_connected_without_message_serializes_bare() {
        let json = serde_json::to_string(&Message::Connected { message: None }).unwrap();
        assert_eq!(json, r#"{"type":"connected"}"#);
    }

    #[test]
    fn test_connected_keeps_informational_message() {
        let json = r#"{"type":"connected","message":"SSH connection established"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            Message::Connected {
                message: Some("SSH connection established".to_string())
            }
        );
    }

    #[test]
    fn test_resize_uses_viewport_dimensions() {
        let size = ViewportSize::new(100, 40).unwrap();
        assert_eq!(Message::resize(size), Message::Resize { cols: 100, rows: 40 });
    }

    #[test]
    fn test_direction_is_fixed_per_tag() {
        assert_eq!(MessageTag::Connect.direction(), Direction::Outbound);
        assert_eq!(MessageTag::Input.direction(), Direction::Outbound);
        assert_eq!(MessageTag::Resize.direction(), Direction::Outbound);
        assert_eq!(MessageTag::Output.direction(), Direction::Inbound);
        assert_eq!(MessageTag::Connected.direction(), Direction::Inbound);
        assert_eq!(MessageTag::Error.direction(), Direction::Inbound);
    }

    #[test]
    fn test_from_wire_matches_every_tag_literal() {
        for tag in MessageTag::ALL {
            assert_eq!(MessageTag::from_wire(tag.as_str()), Some(tag));
        }
        assert_eq!(MessageTag::from_wire("ping"), None);
        assert_eq!(MessageTag::from_wire("Output"), None);
    }

    #[test]
    fn test_tag_matches_serialized_type_field() {
        let messages = [
            Message::input("ls\n"),
            Message::Output { data: "x".to_string() },
            Message::Error { error: "e".to_string() },
        ];
        for msg in messages {
            let value = serde_json::to_value(&msg).unwrap();
            assert_eq!(value["type"], msg.tag().as_str());
        }
    }
}
