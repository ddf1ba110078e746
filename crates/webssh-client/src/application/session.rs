//! Session lifecycle state machine.
//!
//! # State machine
//!
//! ```text
//!            connect()                 "connected"
//!   Idle ───────────────► Connecting ─────────────► Active
//!     │                      │  ▲                      │
//!     │ disconnect()         │  │ connect()            │ "error" / transport error /
//!     ▼                      ▼  │ (supersede)          │ remote close / disconnect()
//!   Closed ◄─────────────────┴──┴──────────────────────┘
//!     │
//!     └── connect() ──► Connecting
//! ```
//!
//! At most one channel is live.  Every channel is tagged with a fresh
//! [`ChannelId`]; events carrying any other id are stale leftovers from a
//! superseded channel and are dropped without touching state.

use thiserror::Error;
use tracing::{debug, info, warn};
use webssh_core::{decode_message, encode_message, Credentials, Message, ProtocolError};

use crate::application::diagnostics;

// ── Identifiers and events ────────────────────────────────────────────────────

/// Identifies one transport channel for the life of the process.
///
/// Ids are handed out in increasing order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u64);

impl ChannelId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
impl ChannelId {
    pub(crate) fn for_test(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something a channel reports back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The channel finished opening and can carry frames.
    Opened,
    /// One complete inbound frame.
    Frame(Vec<u8>),
    /// The channel failed; no further events follow.
    Error(String),
    /// The remote end closed the channel; no further events follow.
    Closed,
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failures of the channel itself, as opposed to the remote session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The channel could not be opened or broke mid-session.
    #[error("{0}")]
    Failed(String),

    /// The remote end closed the channel.
    #[error("connection closed by remote end")]
    ClosedByRemote,

    /// A frame was handed to a channel that is already shutting down.
    #[error("channel is closed")]
    ChannelClosed,
}

/// Why a session ended.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The gateway reported an error, typically an SSH dial or auth failure.
    #[error("remote error: {0}")]
    Remote(String),

    /// The `connect` message could not be encoded.
    #[error("could not encode connect message: {0}")]
    Encode(#[from] ProtocolError),
}

// ── Ports ─────────────────────────────────────────────────────────────────────

/// Opens channels to the gateway.
///
/// `open` never fails synchronously.  A channel that cannot be established
/// reports [`ChannelEvent::Error`] under its id instead.
pub trait Transport: Send {
    fn open(&mut self, id: ChannelId, endpoint: &str) -> Box<dyn Channel>;
}

/// The session's handle on one open (or opening) channel.
pub trait Channel: Send {
    /// Queues one outbound frame.
    fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError>;

    /// Closes the channel.  Consuming the handle means a channel is closed at
    /// most once.
    fn close(self: Box<Self>);
}

/// Where remote output and diagnostics are written.
pub trait RenderSink: Send {
    fn write(&mut self, bytes: &[u8]);
}

// ── State ─────────────────────────────────────────────────────────────────────

/// Lifecycle state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing has been attempted yet.
    Idle,
    /// A channel is opening or the gateway has not acknowledged yet.
    Connecting,
    /// The gateway acknowledged the session; input and output flow.
    Active,
    /// The last session ended, by request or by failure.
    Closed,
}

/// What handling one channel event did to the session.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State did not change.
    Unchanged,
    /// The session just became [`SessionState::Active`].
    Activated,
    /// The session just ended with an error.
    Closed,
}

struct LiveChannel {
    id: ChannelId,
    handle: Box<dyn Channel>,
}

/// Owns the current channel and the session state built on top of it.
pub struct SessionLifecycle {
    endpoint: String,
    transport: Box<dyn Transport>,
    sink: Box<dyn RenderSink>,
    state: SessionState,
    channel: Option<LiveChannel>,
    /// Credentials waiting for the channel to open.
    pending: Option<Credentials>,
    last_error: Option<SessionError>,
    next_channel: u64,
}

impl SessionLifecycle {
    pub fn new(
        endpoint: impl Into<String>,
        transport: Box<dyn Transport>,
        sink: Box<dyn RenderSink>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
            sink,
            state: SessionState::Idle,
            channel: None,
            pending: None,
            last_error: None,
            next_channel: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The error that ended the most recent session, if it failed.
    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    /// `true` when a fresh `connect` would not interrupt anything.
    pub fn accepts_credentials(&self) -> bool {
        matches!(self.state, SessionState::Idle | SessionState::Closed)
    }

    /// Id of the live channel, if any.
    pub fn current_channel(&self) -> Option<ChannelId> {
        self.channel.as_ref().map(|c| c.id)
    }

    /// Starts a new session, superseding any live one.
    ///
    /// The previous channel (if any) is closed before the new one is opened.
    /// The credentials are sent once the new channel reports
    /// [`ChannelEvent::Opened`].
    pub fn connect(&mut self, credentials: Credentials) {
        if let Some(old) = self.current_channel() {
            info!("superseding session on channel {old}");
        }
        self.close_channel();

        self.next_channel += 1;
        let id = ChannelId(self.next_channel);
        info!(
            "opening channel {id} to {} for {}@{}:{}",
            self.endpoint, credentials.username, credentials.host, credentials.port
        );
        let handle = self.transport.open(id, &self.endpoint);

        self.channel = Some(LiveChannel { id, handle });
        self.pending = Some(credentials);
        self.last_error = None;
        self.state = SessionState::Connecting;
    }

    /// Ends the current session.  Idempotent.
    pub fn disconnect(&mut self) {
        if self.state == SessionState::Closed {
            debug!("disconnect ignored: already closed");
            return;
        }
        info!("disconnecting");
        self.close_channel();
        self.pending = None;
        self.state = SessionState::Closed;
    }

    /// Applies one event reported by the channel `id`.
    pub fn handle_channel_event(&mut self, id: ChannelId, event: ChannelEvent) -> Outcome {
        if self.current_channel() != Some(id) {
            debug!("dropping {} from stale channel {id}", event_name(&event));
            return Outcome::Unchanged;
        }

        match event {
            ChannelEvent::Opened => self.on_opened(),
            ChannelEvent::Frame(frame) => self.on_frame(&frame),
            ChannelEvent::Error(reason) => {
                self.fail(TransportError::Failed(reason).into());
                Outcome::Closed
            }
            ChannelEvent::Closed => {
                self.fail(TransportError::ClosedByRemote.into());
                Outcome::Closed
            }
        }
    }

    /// Sends `msg` on the live channel if the session is Active.
    ///
    /// Returns `true` when the frame was handed to the channel.  Anything
    /// else (wrong state, encode failure, channel already closing) drops the
    /// message.
    pub fn send_active(&mut self, msg: &Message) -> bool {
        if self.state != SessionState::Active {
            debug!("dropping {}: session is {:?}", msg.tag(), self.state);
            return false;
        }
        let Some(channel) = self.channel.as_mut() else {
            return false;
        };
        let frame = match encode_message(msg) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("not sending {}: {e}", msg.tag());
                return false;
            }
        };
        match channel.handle.send(frame) {
            Ok(()) => true,
            Err(e) => {
                debug!("dropping {} on channel {}: {e}", msg.tag(), channel.id);
                false
            }
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn on_opened(&mut self) -> Outcome {
        if self.state != SessionState::Connecting {
            return Outcome::Unchanged;
        }
        let Some(credentials) = self.pending.take() else {
            debug!("channel opened twice; ignoring");
            return Outcome::Unchanged;
        };

        let frame = match encode_message(&Message::connect(&credentials)) {
            Ok(frame) => frame,
            Err(e) => {
                self.fail(e.into());
                return Outcome::Closed;
            }
        };
        if let Some(channel) = self.channel.as_mut() {
            // A failed send is followed by the channel's own Error or Closed.
            if let Err(e) = channel.handle.send(frame) {
                debug!("connect not sent on channel {}: {e}", channel.id);
            }
        }
        Outcome::Unchanged
    }

    fn on_frame(&mut self, frame: &[u8]) -> Outcome {
        let msg = match decode_message(frame) {
            Ok(msg) => msg,
            Err(ProtocolError::UnknownTag(tag)) => {
                debug!("ignoring frame with unknown type {tag:?}");
                return Outcome::Unchanged;
            }
            Err(e) => {
                warn!("dropping undecodable frame: {e}");
                return Outcome::Unchanged;
            }
        };

        match (self.state, msg) {
            (SessionState::Connecting, Message::Connected { message }) => {
                self.state = SessionState::Active;
                info!(
                    "session active: {}",
                    message.as_deref().unwrap_or("connected")
                );
                self.sink.write(diagnostics::connected().as_bytes());
                Outcome::Activated
            }
            (SessionState::Connecting | SessionState::Active, Message::Error { error }) => {
                self.fail(SessionError::Remote(error));
                Outcome::Closed
            }
            (SessionState::Active, Message::Output { data }) => {
                self.sink.write(data.as_bytes());
                Outcome::Unchanged
            }
            (state, msg) => {
                debug!("ignoring {} while {state:?}", msg.tag());
                Outcome::Unchanged
            }
        }
    }

    /// Ends the session with `error`: one diagnostic, channel closed, error
    /// recorded.
    fn fail(&mut self, error: SessionError) {
        warn!("session ended: {error}");
        self.sink
            .write(diagnostics::session_ended(&error).as_bytes());
        self.close_channel();
        self.pending = None;
        self.state = SessionState::Closed;
        self.last_error = Some(error);
    }

    fn close_channel(&mut self) {
        if let Some(channel) = self.channel.take() {
            debug!("closing channel {}", channel.id);
            channel.handle.close();
        }
    }
}

/// Event kind for logging; never includes frame contents.
fn event_name(event: &ChannelEvent) -> &'static str {
    match event {
        ChannelEvent::Opened => "Opened",
        ChannelEvent::Frame(_) => "Frame",
        ChannelEvent::Error(_) => "Error",
        ChannelEvent::Closed => "Closed",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
