//! Bridges the local terminal surface to the session.
//!
//! Keystrokes become `input` messages and viewport measurements become
//! `resize` messages.  Both are only sent while the session is Active.

use tracing::debug;
use webssh_core::{Message, ViewportSize};

use crate::application::session::{ChannelId, SessionLifecycle, SessionState};

/// Measures the visible terminal area.
pub trait Viewport: Send {
    /// Recomputes the grid that fits the current surface.
    ///
    /// `None` when the surface cannot be measured right now (for example
    /// stdout is not a terminal).
    fn fit(&mut self) -> Option<ViewportSize>;
}

pub struct ViewportBridge {
    viewport: Box<dyn Viewport>,
    size: ViewportSize,
    /// Last size sent, and the channel it went to.
    last_sent: Option<(ChannelId, ViewportSize)>,
}

impl ViewportBridge {
    pub fn new(viewport: Box<dyn Viewport>) -> Self {
        Self {
            viewport,
            size: ViewportSize::DEFAULT,
            last_sent: None,
        }
    }

    /// The last known viewport size.
    pub fn size(&self) -> ViewportSize {
        self.size
    }

    /// Forwards one chunk of local input.  Returns `true` if it was sent.
    pub fn on_input(&mut self, session: &mut SessionLifecycle, data: &str) -> bool {
        if data.is_empty() {
            return false;
        }
        session.send_active(&Message::input(data))
    }

    /// Re-measures the viewport and reports the size if it changed.
    ///
    /// The first report on every channel is always sent.  After that an
    /// unchanged size is coalesced away.  Returns `true` if a `resize` was
    /// sent.
    pub fn on_layout(&mut self, session: &mut SessionLifecycle) -> bool {
        match self.viewport.fit() {
            Some(size) => self.size = size,
            None => {
                debug!(
                    "viewport not measurable; keeping {}x{}",
                    self.size.cols(),
                    self.size.rows()
                );
                return false;
            }
        }

        if session.state() != SessionState::Active {
            return false;
        }
        let Some(channel) = session.current_channel() else {
            return false;
        };
        if self.last_sent == Some((channel, self.size)) {
            debug!(
                "resize {}x{} unchanged; not sent",
                self.size.cols(),
                self.size.rows()
            );
            return false;
        }

        let sent = session.send_active(&Message::resize(self.size));
        if sent {
            self.last_sent = Some((channel, self.size));
        }
        sent
    }

    /// The settle timer takes the same path as a layout change.
    pub fn on_settle_timer(&mut self, session: &mut SessionLifecycle) -> bool {
        self.on_layout(session)
    }
}
