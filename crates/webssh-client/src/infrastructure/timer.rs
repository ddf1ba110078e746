//! Tokio-backed settle timer.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::application::{ChannelId, ClientEvent, SettleTimer};

/// Delivers [`ClientEvent::SettleTimerFired`] on the client's event queue
/// after the requested delay.
///
/// Timers are never cancelled.  A timer that outlives its channel fires
/// anyway and the client ignores it because the id no longer matches.
pub struct TokioSettleTimer {
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl TokioSettleTimer {
    pub fn new(events: mpsc::UnboundedSender<ClientEvent>) -> Self {
        Self { events }
    }
}

impl SettleTimer for TokioSettleTimer {
    fn schedule(&mut self, channel: ChannelId, delay: Duration) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if events.send(ClientEvent::SettleTimerFired(channel)).is_err() {
                debug!("settle timer for channel {channel} fired after shutdown");
            }
        });
    }
}
