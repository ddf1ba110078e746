//! End-to-end session tests against a local WebSocket gateway stand-in.
//!
//! Each test binds a real listener on `127.0.0.1:0`, scripts the gateway
//! side with `tokio_tungstenite::accept_async`, and drives a fully wired
//! [`TerminalClient`] through the same event loop the binary uses.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message as WsMessage};

use webssh_client::application::{
    ClientEvent, RenderSink, SessionError, SessionLifecycle, SessionState, TerminalClient,
    TransportError, Viewport, ViewportBridge,
};
use webssh_client::infrastructure::{drive, run_until, TokioSettleTimer, WebSocketTransport};
use webssh_core::{Credentials, ViewportSize};

const WAIT: Duration = Duration::from_secs(10);

// ── Doubles ───────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl RenderSink for CapturedOutput {
    fn write(&mut self, bytes: &[u8]) {
        self.0.lock().unwrap().extend_from_slice(bytes);
    }
}

struct FixedViewport(ViewportSize);

impl Viewport for FixedViewport {
    fn fit(&mut self) -> Option<ViewportSize> {
        Some(self.0)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Wired {
    client: TerminalClient,
    events: mpsc::UnboundedSender<ClientEvent>,
    queue: mpsc::UnboundedReceiver<ClientEvent>,
    output: CapturedOutput,
}

fn wire(endpoint: String) -> Wired {
    let (events, queue) = mpsc::unbounded_channel();
    let output = CapturedOutput::default();
    let session = SessionLifecycle::new(
        endpoint,
        Box::new(WebSocketTransport::new(events.clone())),
        Box::new(output.clone()),
    );
    let client = TerminalClient::new(
        session,
        ViewportBridge::new(Box::new(FixedViewport(
            ViewportSize::new(132, 43).unwrap(),
        ))),
        Box::new(TokioSettleTimer::new(events.clone())),
        Duration::from_millis(10),
    );
    Wired {
        client,
        events,
        queue,
        output,
    }
}

fn alice() -> Credentials {
    Credentials::new("10.0.0.5", 22, "alice", "s3cret").unwrap()
}

async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

fn parse(msg: WsMessage) -> Value {
    match msg {
        WsMessage::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_session_connect_type_resize_output_close() {
    // Arrange: the gateway checks connect, acknowledges, waits for one input
    // and one resize, sends output, then hangs up.
    let (listener, addr) = bind().await;
    let gateway = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        let connect = parse(ws.next().await.unwrap().unwrap());
        ws.send(WsMessage::Text(
            r#"{"type":"connected","message":"SSH connection established"}"#.to_string(),
        ))
        .await
        .unwrap();

        let mut input = None;
        let mut resize = None;
        while input.is_none() || resize.is_none() {
            let frame = parse(ws.next().await.unwrap().unwrap());
            match frame["type"].as_str() {
                Some("input") => input = Some(frame),
                Some("resize") => resize = Some(frame),
                other => panic!("unexpected frame type {other:?}"),
            }
        }

        ws.send(WsMessage::Text(
            r#"{"type":"output","data":"hello\r\n"}"#.to_string(),
        ))
        .await
        .unwrap();
        ws.close(None).await.unwrap();
        (connect, input.unwrap(), resize.unwrap())
    });
    let mut w = wire(format!("ws://{addr}/ws"));

    // Act
    w.events.send(ClientEvent::Connect(alice())).unwrap();
    let active = timeout(
        WAIT,
        run_until(&mut w.client, &mut w.queue, |c| {
            c.state() == SessionState::Active
        }),
    )
    .await
    .unwrap();
    w.events
        .send(ClientEvent::LocalInput("ls\n".to_string()))
        .unwrap();
    let state = timeout(WAIT, drive(&mut w.client, &mut w.queue))
        .await
        .unwrap();
    let (connect, input, resize) = timeout(WAIT, gateway).await.unwrap().unwrap();

    // Assert
    assert!(active);
    assert_eq!(connect["type"], "connect");
    assert_eq!(connect["host"], "10.0.0.5");
    assert_eq!(connect["port"], "22");
    assert_eq!(connect["username"], "alice");
    assert_eq!(connect["password"], "s3cret");
    assert_eq!(input["data"], "ls\n");
    assert_eq!(resize["cols"], 132);
    assert_eq!(resize["rows"], 43);

    assert_eq!(state, SessionState::Closed);
    assert_eq!(
        w.client.last_error(),
        Some(&SessionError::Transport(TransportError::ClosedByRemote))
    );
    let text = w.output.text();
    let connected_at = text.find("Connected to SSH server").unwrap();
    let hello_at = text.find("hello\r\n").unwrap();
    let closed_at = text.find("Connection closed").unwrap();
    assert!(connected_at < hello_at && hello_at < closed_at);
}

#[tokio::test]
async fn test_gateway_error_during_connect_closes_session() {
    // Arrange
    let (listener, addr) = bind().await;
    let gateway = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let _connect = ws.next().await;
        ws.send(WsMessage::Text(
            r#"{"type":"error","error":"Failed to connect to SSH server: auth failed"}"#
                .to_string(),
        ))
        .await
        .unwrap();
        // Wait for the client to hang up.
        while let Some(Ok(_)) = ws.next().await {}
    });
    let mut w = wire(format!("ws://{addr}/ws"));

    // Act
    w.events.send(ClientEvent::Connect(alice())).unwrap();
    let state = timeout(WAIT, drive(&mut w.client, &mut w.queue))
        .await
        .unwrap();
    timeout(WAIT, gateway).await.unwrap().unwrap();

    // Assert
    assert_eq!(state, SessionState::Closed);
    assert_eq!(
        w.client.last_error(),
        Some(&SessionError::Remote(
            "Failed to connect to SSH server: auth failed".to_string()
        ))
    );
    assert!(w
        .output
        .text()
        .contains("\x1b[31mError: Failed to connect to SSH server: auth failed\x1b[0m"));
    assert!(w.client.accepts_credentials());
}

#[tokio::test]
async fn test_unreachable_gateway_reports_connection_error() {
    // Arrange: bind and release a port so nothing is listening on it.
    let (listener, addr) = bind().await;
    drop(listener);
    let mut w = wire(format!("ws://{addr}/ws"));

    // Act
    w.events.send(ClientEvent::Connect(alice())).unwrap();
    let state = timeout(WAIT, drive(&mut w.client, &mut w.queue))
        .await
        .unwrap();

    // Assert
    assert_eq!(state, SessionState::Closed);
    assert!(matches!(
        w.client.last_error(),
        Some(SessionError::Transport(TransportError::Failed(_)))
    ));
    assert!(w.output.text().contains("Connection error:"));
}

#[tokio::test]
async fn test_explicit_disconnect_closes_without_diagnostic() {
    // Arrange
    let (listener, addr) = bind().await;
    let gateway = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let _connect = ws.next().await;
        ws.send(WsMessage::Text(r#"{"type":"connected"}"#.to_string()))
            .await
            .unwrap();
        let mut frames = 0usize;
        while let Some(Ok(msg)) = ws.next().await {
            if matches!(msg, WsMessage::Text(_)) {
                frames += 1;
            }
        }
        frames
    });
    let mut w = wire(format!("ws://{addr}/ws"));
    w.events.send(ClientEvent::Connect(alice())).unwrap();
    timeout(
        WAIT,
        run_until(&mut w.client, &mut w.queue, |c| {
            c.state() == SessionState::Active
        }),
    )
    .await
    .unwrap();
    let written_before = w.output.text();

    // Act
    w.client.handle(ClientEvent::Disconnect);
    w.client.handle(ClientEvent::Disconnect);

    // Assert
    assert_eq!(w.client.state(), SessionState::Closed);
    assert!(w.client.last_error().is_none());
    assert_eq!(w.output.text(), written_before);
    timeout(WAIT, gateway).await.unwrap().unwrap();
}
