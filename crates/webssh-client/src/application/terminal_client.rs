//! The single dispatch point for everything that happens to the client.
//!
//! Channel callbacks, keystrokes, layout changes and timer expiries all
//! arrive as [`ClientEvent`]s and are handled strictly one at a time, in
//! delivery order, by [`TerminalClient::handle`].

use std::time::Duration;

use tracing::debug;
use webssh_core::{Credentials, ViewportSize};

use crate::application::session::{
    ChannelEvent, ChannelId, Outcome, SessionError, SessionLifecycle, SessionState,
};
use crate::application::viewport_bridge::ViewportBridge;

/// Schedules the one-shot settling resize after activation.
pub trait SettleTimer: Send {
    /// Arranges for [`ClientEvent::SettleTimerFired`] carrying `channel` to be
    /// delivered after `delay`.
    fn schedule(&mut self, channel: ChannelId, delay: Duration);
}

/// Every input the client reacts to.
#[derive(Debug)]
pub enum ClientEvent {
    /// The user submitted credentials.
    Connect(Credentials),
    /// The user asked to end the session.
    Disconnect,
    /// A channel reported something.
    Channel { id: ChannelId, event: ChannelEvent },
    /// Keystrokes from the local terminal.
    LocalInput(String),
    /// The local surface may have changed size.
    Layout,
    /// The settle timer armed for `ChannelId` expired.
    SettleTimerFired(ChannelId),
}

impl ClientEvent {
    /// Variant name for logging.  Never includes credentials or keystrokes.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientEvent::Connect(_) => "Connect",
            ClientEvent::Disconnect => "Disconnect",
            ClientEvent::Channel { .. } => "Channel",
            ClientEvent::LocalInput(_) => "LocalInput",
            ClientEvent::Layout => "Layout",
            ClientEvent::SettleTimerFired(_) => "SettleTimerFired",
        }
    }
}

pub struct TerminalClient {
    session: SessionLifecycle,
    bridge: ViewportBridge,
    timer: Box<dyn SettleTimer>,
    settle_delay: Duration,
}

impl TerminalClient {
    pub fn new(
        session: SessionLifecycle,
        bridge: ViewportBridge,
        timer: Box<dyn SettleTimer>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            session,
            bridge,
            timer,
            settle_delay,
        }
    }

    /// Handles one event to completion.
    pub fn handle(&mut self, event: ClientEvent) {
        debug!("handling {}", event.kind());
        match event {
            ClientEvent::Connect(credentials) => self.session.connect(credentials),
            ClientEvent::Disconnect => self.session.disconnect(),
            ClientEvent::Channel { id, event } => {
                if self.session.handle_channel_event(id, event) == Outcome::Activated {
                    self.timer.schedule(id, self.settle_delay);
                }
            }
            ClientEvent::LocalInput(data) => {
                self.bridge.on_input(&mut self.session, &data);
            }
            ClientEvent::Layout => {
                self.bridge.on_layout(&mut self.session);
            }
            ClientEvent::SettleTimerFired(id) => {
                if self.session.current_channel() == Some(id) {
                    self.bridge.on_settle_timer(&mut self.session);
                } else {
                    debug!("settle timer for stale channel {id} ignored");
                }
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.session.last_error()
    }

    pub fn accepts_credentials(&self) -> bool {
        self.session.accepts_credentials()
    }

    pub fn current_channel(&self) -> Option<ChannelId> {
        self.session.current_channel()
    }

    pub fn viewport_size(&self) -> ViewportSize {
        self.bridge.size()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
