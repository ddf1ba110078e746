//! Recording test doubles for the application-layer traits.
//!
//! Every double shares its record through an `Arc<Mutex<_>>`, so a test keeps
//! one clone for assertions and hands the other to the code under test.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use webssh_core::{decode_message, Message, ViewportSize};

use crate::application::session::{Channel, ChannelId, RenderSink, Transport, TransportError};
use crate::application::terminal_client::SettleTimer;
use crate::application::viewport_bridge::Viewport;

/// Everything the recording transport observed, in call order.
#[derive(Debug, Default)]
pub(crate) struct Wire {
    pub opened: Vec<(ChannelId, String)>,
    pub sent: Vec<(ChannelId, Message)>,
    pub closed: Vec<ChannelId>,
    /// When `true`, `send` fails as if the channel were already closing.
    pub fail_sends: bool,
}

#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    pub wire: Arc<Mutex<Wire>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<(ChannelId, Message)> {
        self.wire.lock().unwrap().sent.clone()
    }

    pub fn sent_messages(&self) -> Vec<Message> {
        self.sent().into_iter().map(|(_, msg)| msg).collect()
    }

    pub fn opened(&self) -> Vec<ChannelId> {
        self.wire.lock().unwrap().opened.iter().map(|(id, _)| *id).collect()
    }

    pub fn closed(&self) -> Vec<ChannelId> {
        self.wire.lock().unwrap().closed.clone()
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.wire.lock().unwrap().fail_sends = fail;
    }
}

impl Transport for RecordingTransport {
    fn open(&mut self, id: ChannelId, endpoint: &str) -> Box<dyn Channel> {
        self.wire
            .lock()
            .unwrap()
            .opened
            .push((id, endpoint.to_string()));
        Box::new(RecordingChannel {
            id,
            wire: Arc::clone(&self.wire),
        })
    }
}

struct RecordingChannel {
    id: ChannelId,
    wire: Arc<Mutex<Wire>>,
}

impl Channel for RecordingChannel {
    fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError> {
        let mut wire = self.wire.lock().unwrap();
        if wire.fail_sends {
            return Err(TransportError::ChannelClosed);
        }
        let msg = decode_message(&frame).expect("client frames must decode");
        wire.sent.push((self.id, msg));
        Ok(())
    }

    fn close(self: Box<Self>) {
        self.wire.lock().unwrap().closed.push(self.id);
    }
}

/// Records every `write` call separately so tests can count them.
#[derive(Clone, Default)]
pub(crate) struct RecordingSink {
    pub writes: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingSink {
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn text(&self) -> String {
        let writes = self.writes.lock().unwrap();
        String::from_utf8_lossy(&writes.concat()).into_owned()
    }
}

impl RenderSink for RecordingSink {
    fn write(&mut self, bytes: &[u8]) {
        self.writes.lock().unwrap().push(bytes.to_vec());
    }
}

/// A viewport whose measurement the test controls.
#[derive(Clone)]
pub(crate) struct FixedViewport {
    pub size: Arc<Mutex<Option<ViewportSize>>>,
}

impl FixedViewport {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            size: Arc::new(Mutex::new(Some(ViewportSize::new(cols, rows).unwrap()))),
        }
    }

    pub fn set(&self, cols: u16, rows: u16) {
        *self.size.lock().unwrap() = Some(ViewportSize::new(cols, rows).unwrap());
    }

    pub fn unmeasurable(&self) {
        *self.size.lock().unwrap() = None;
    }
}

impl Viewport for FixedViewport {
    fn fit(&mut self) -> Option<ViewportSize> {
        *self.size.lock().unwrap()
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingTimer {
    pub scheduled: Arc<Mutex<Vec<(ChannelId, Duration)>>>,
}

impl RecordingTimer {
    pub fn scheduled(&self) -> Vec<(ChannelId, Duration)> {
        self.scheduled.lock().unwrap().clone()
    }
}

impl SettleTimer for RecordingTimer {
    fn schedule(&mut self, channel: ChannelId, delay: Duration) {
        self.scheduled.lock().unwrap().push((channel, delay));
    }
}
