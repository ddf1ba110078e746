//! WebSocket transport to the session gateway.
//!
//! Each channel runs in its own Tokio task.  The task reports everything it
//! sees as [`ClientEvent::Channel`] on the client's single event queue, so
//! channel callbacks are ordered with every other input the client handles.
//!
//! # Channel task
//!
//! 1. Connect to the endpoint, while still listening for a local close.
//! 2. Report `Opened`, then split the socket into sink and stream halves.
//! 3. Select over local commands (send / close) and inbound frames until
//!    either side finishes.
//!
//! A channel closed locally reports nothing further.  A channel that fails
//! or is closed by the gateway reports exactly one `Error` or `Closed`.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, info, warn};

use crate::application::{
    Channel, ChannelEvent, ChannelId, ClientEvent, Transport, TransportError,
};

// ── Public API ────────────────────────────────────────────────────────────────

/// Opens WebSocket channels and reports their events to `events`.
pub struct WebSocketTransport {
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl WebSocketTransport {
    pub fn new(events: mpsc::UnboundedSender<ClientEvent>) -> Self {
        Self { events }
    }
}

impl Transport for WebSocketTransport {
    fn open(&mut self, id: ChannelId, endpoint: &str) -> Box<dyn Channel> {
        let (commands, command_rx) = mpsc::unbounded_channel();
        tokio::spawn(drive_channel(
            id,
            endpoint.to_string(),
            command_rx,
            self.events.clone(),
        ));
        Box::new(WebSocketChannel { commands })
    }
}

/// Commands from the session to the channel task.
#[derive(Debug)]
enum ChannelCommand {
    Send(Vec<u8>),
    Close,
}

/// Session-side handle on one channel task.
struct WebSocketChannel {
    commands: mpsc::UnboundedSender<ChannelCommand>,
}

impl Channel for WebSocketChannel {
    fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError> {
        self.commands
            .send(ChannelCommand::Send(frame))
            .map_err(|_| TransportError::ChannelClosed)
    }

    fn close(self: Box<Self>) {
        // The task may already be gone; dropping the sender ends it either way.
        let _ = self.commands.send(ChannelCommand::Close);
    }
}

// ── Channel task ──────────────────────────────────────────────────────────────

async fn drive_channel(
    id: ChannelId,
    endpoint: String,
    mut commands: mpsc::UnboundedReceiver<ChannelCommand>,
    events: mpsc::UnboundedSender<ClientEvent>,
) {
    let report = |event: ChannelEvent| {
        if events.send(ClientEvent::Channel { id, event }).is_err() {
            debug!("channel {id}: client gone; event dropped");
        }
    };

    // ── Step 1: Connect ───────────────────────────────────────────────────────
    //
    // Frames queued before the socket opens are held here and flushed once it
    // does.  The session never sends before `Opened`, so this stays empty in
    // practice.
    let mut early: Vec<Vec<u8>> = Vec::new();
    let connect = connect_async(endpoint.as_str());
    tokio::pin!(connect);
    let ws_stream = loop {
        tokio::select! {
            result = &mut connect => match result {
                Ok((stream, _response)) => break stream,
                Err(e) => {
                    warn!("channel {id}: connect to {endpoint} failed: {e}");
                    report(ChannelEvent::Error(e.to_string()));
                    return;
                }
            },
            command = commands.recv() => match command {
                Some(ChannelCommand::Send(frame)) => early.push(frame),
                Some(ChannelCommand::Close) | None => {
                    debug!("channel {id}: closed before open");
                    return;
                }
            },
        }
    };

    info!("channel {id}: connected to {endpoint}");
    report(ChannelEvent::Opened);

    // ── Step 2: Split ─────────────────────────────────────────────────────────
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    for frame in early {
        if let Err(e) = ws_tx.send(to_ws_message(frame)).await {
            warn!("channel {id}: send failed: {e}");
            report(ChannelEvent::Error(e.to_string()));
            return;
        }
    }

    // ── Step 3: Forward until either side finishes ────────────────────────────
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(ChannelCommand::Send(frame)) => {
                    if let Err(e) = ws_tx.send(to_ws_message(frame)).await {
                        warn!("channel {id}: send failed: {e}");
                        report(ChannelEvent::Error(e.to_string()));
                        return;
                    }
                }
                Some(ChannelCommand::Close) | None => {
                    debug!("channel {id}: closing");
                    if let Err(e) = ws_tx.close().await {
                        debug!("channel {id}: close handshake failed: {e}");
                    }
                    return;
                }
            },
            inbound = ws_rx.next() => match inbound {
                Some(Ok(WsMessage::Text(text))) => {
                    report(ChannelEvent::Frame(text.into_bytes()));
                }
                Some(Ok(WsMessage::Binary(bytes))) => {
                    report(ChannelEvent::Frame(bytes));
                }
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => {}
                Some(Ok(WsMessage::Close(_))) | None => {
                    info!("channel {id}: closed by gateway");
                    report(ChannelEvent::Closed);
                    return;
                }
                Some(Err(WsError::ConnectionClosed)) => {
                    report(ChannelEvent::Closed);
                    return;
                }
                Some(Err(e)) => {
                    warn!("channel {id}: receive failed: {e}");
                    report(ChannelEvent::Error(e.to_string()));
                    return;
                }
            },
        }
    }
}

/// Frames that are valid UTF-8 go out as text frames, which is what the
/// gateway reads.
fn to_ws_message(frame: Vec<u8>) -> WsMessage {
    match String::from_utf8(frame) {
        Ok(text) => WsMessage::Text(text),
        Err(e) => WsMessage::Binary(e.into_bytes()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
