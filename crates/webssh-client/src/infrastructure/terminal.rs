//! Adapters between the local terminal and the application layer.
//!
//! - [`StdoutSink`] renders remote output by writing it straight to stdout.
//! - [`TerminalViewport`] measures the terminal with `crossterm`.
//! - [`RawModeGuard`] keeps the terminal in raw mode for its lifetime.
//! - [`spawn_stdin_reader`] and [`spawn_resize_watcher`] turn keystrokes and
//!   window changes into [`ClientEvent`]s.

use std::io::Write;

use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use webssh_core::ViewportSize;

use crate::application::{ClientEvent, RenderSink, Viewport};

const STDIN_BUF_SIZE: usize = 4096;

// ── Render sink ───────────────────────────────────────────────────────────────

/// Writes remote output to stdout, flushing after every write so partial
/// lines (prompts) appear immediately.
pub struct StdoutSink {
    out: std::io::Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for StdoutSink {
    fn write(&mut self, bytes: &[u8]) {
        let mut out = self.out.lock();
        if let Err(e) = out.write_all(bytes).and_then(|()| out.flush()) {
            warn!("stdout write failed: {e}");
        }
    }
}

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Measures the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalViewport;

impl Viewport for TerminalViewport {
    fn fit(&mut self) -> Option<ViewportSize> {
        match crossterm::terminal::size() {
            Ok((cols, rows)) => ViewportSize::new(cols, rows).ok(),
            Err(e) => {
                debug!("terminal size unavailable: {e}");
                None
            }
        }
    }
}

// ── Raw mode ──────────────────────────────────────────────────────────────────

/// Enables raw mode on creation and restores the terminal on drop.
///
/// In raw mode every keystroke, including Ctrl+C and arrow keys, reaches
/// stdin as bytes and is forwarded to the remote shell unchanged.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    /// # Errors
    ///
    /// Returns the `crossterm` error when the terminal refuses raw mode.
    pub fn enable() -> std::io::Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = crossterm::terminal::disable_raw_mode() {
            warn!("failed to restore terminal mode: {e}");
        }
    }
}

// ── UTF-8 chunking ────────────────────────────────────────────────────────────

/// Turns arbitrary byte reads into complete UTF-8 strings.
///
/// A multi-byte character split across two reads is held back until its
/// remaining bytes arrive.  Bytes that can never form valid UTF-8 become
/// U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Chunker {
    pending: Vec<u8>,
}

impl Utf8Chunker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `bytes` and returns every complete character decoded so far.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                    }
                }
            }
        }
    }
}

// ── Event sources ─────────────────────────────────────────────────────────────

/// Reads stdin and reports it as [`ClientEvent::LocalInput`].
///
/// End of input is reported as [`ClientEvent::Disconnect`].
pub fn spawn_stdin_reader(events: mpsc::UnboundedSender<ClientEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stdin = tokio::io::stdin();
        let mut buf = [0u8; STDIN_BUF_SIZE];
        let mut chunker = Utf8Chunker::new();
        loop {
            let n = match stdin.read(&mut buf).await {
                Ok(0) => {
                    debug!("stdin closed");
                    break;
                }
                Ok(n) => n,
                Err(e) => {
                    warn!("stdin read failed: {e}");
                    break;
                }
            };
            let text = chunker.push(&buf[..n]);
            if text.is_empty() {
                continue;
            }
            if events.send(ClientEvent::LocalInput(text)).is_err() {
                return;
            }
        }
        let _ = events.send(ClientEvent::Disconnect);
    })
}

/// Reports every terminal window change as [`ClientEvent::Layout`].
#[cfg(unix)]
pub fn spawn_resize_watcher(events: mpsc::UnboundedSender<ClientEvent>) -> JoinHandle<()> {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut winch = match signal(SignalKind::window_change()) {
            Ok(s) => s,
            Err(e) => {
                warn!("cannot watch window size: {e}");
                return;
            }
        };
        while winch.recv().await.is_some() {
            if events.send(ClientEvent::Layout).is_err() {
                return;
            }
        }
    })
}

/// Window-change signals do not exist here; the size is only measured at
/// activation.
#[cfg(not(unix))]
pub fn spawn_resize_watcher(_events: mpsc::UnboundedSender<ClientEvent>) -> JoinHandle<()> {
    tokio::spawn(async {})
}

// ── Tests ─────────────────────────────────────────────────────────────────────
