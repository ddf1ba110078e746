//! webssh: an interactive remote shell over a WebSocket session gateway.
//!
//! The gateway speaks a small JSON protocol and bridges it to SSH.  This
//! binary turns the local terminal into the session's surface: stdout renders
//! remote output, stdin supplies keystrokes, and window changes become
//! `resize` messages.
//!
//! # Usage
//!
//! ```text
//! webssh --host <HOST> --username <USER> [OPTIONS]
//!
//! Options:
//!   --config <PATH>            TOML config file
//!   --endpoint <URL>           Gateway WebSocket URL [default: ws://localhost:5000/ws]
//!   --host <HOST>              SSH server host
//!   --port <PORT>              SSH server port [default: 22]
//!   --username <USER>          SSH username
//!   --password <PASS>          SSH password
//!   --settle-delay-ms <MS>     Delay before the settling resize [default: 100]
//! ```
//!
//! # Environment variables
//!
//! | Variable          | Description                 |
//! |-------------------|-----------------------------|
//! | `WEBSSH_ENDPOINT` | Gateway WebSocket URL       |
//! | `WEBSSH_PASSWORD` | SSH password                |
//! | `RUST_LOG`        | Log filter (logs go to stderr) |
//!
//! CLI arguments override the config file, which overrides built-in defaults.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use webssh_client::application::{
    ClientEvent, SessionLifecycle, SessionState, TerminalClient, ViewportBridge,
};
use webssh_client::domain::ClientConfig;
use webssh_client::infrastructure::config_file::validate_endpoint;
use webssh_client::infrastructure::{
    drive, load_config, spawn_resize_watcher, spawn_stdin_reader, RawModeGuard, StdoutSink,
    TerminalViewport, TokioSettleTimer, WebSocketTransport,
};
use webssh_core::{parse_port, Credentials, DEFAULT_SSH_PORT};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Interactive remote shell over a WebSocket session gateway.
#[derive(Debug, Parser)]
#[command(
    name = "webssh",
    about = "Interactive SSH sessions through a WebSocket gateway",
    version
)]
struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Gateway WebSocket URL (ws:// or wss://).
    #[arg(long, env = "WEBSSH_ENDPOINT")]
    endpoint: Option<String>,

    /// SSH server host, as seen from the gateway.
    #[arg(long)]
    host: String,

    /// SSH server port.
    #[arg(long, default_value_t = DEFAULT_SSH_PORT, value_parser = parse_port)]
    port: u16,

    /// SSH username.
    #[arg(long)]
    username: String,

    /// SSH password.
    #[arg(long, env = "WEBSSH_PASSWORD", hide_env_values = true)]
    password: String,

    /// Milliseconds between activation and the settling resize.
    #[arg(long)]
    settle_delay_ms: Option<u64>,
}

impl Cli {
    /// Builds the runtime configuration: defaults, then the config file, then
    /// CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or any endpoint
    /// is not a WebSocket URL.
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?
                .into_client_config()?,
            None => ClientConfig::default(),
        };

        if let Some(endpoint) = &self.endpoint {
            validate_endpoint(endpoint)?;
            config.endpoint = endpoint.clone();
        }
        if let Some(ms) = self.settle_delay_ms {
            config.settle_delay = Duration::from_millis(ms);
        }
        Ok(config)
    }

    fn credentials(&self) -> anyhow::Result<Credentials> {
        Ok(Credentials::new(
            self.host.clone(),
            self.port,
            self.username.clone(),
            self.password.clone(),
        )?)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let result = run(Cli::parse()).await;

    // The stdin reader is parked in a blocking read that cannot be cancelled;
    // exit explicitly instead of waiting for the runtime to wind down.
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.client_config()?;
    let credentials = cli.credentials()?;

    // stdout is the terminal surface, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "webssh starting: endpoint={}, target={}@{}:{}",
        config.endpoint, credentials.username, credentials.host, credentials.port
    );

    // ── Wiring ────────────────────────────────────────────────────────────────
    let (events, mut queue) = mpsc::unbounded_channel();

    let session = SessionLifecycle::new(
        config.endpoint.clone(),
        Box::new(WebSocketTransport::new(events.clone())),
        Box::new(StdoutSink::new()),
    );
    let mut client = TerminalClient::new(
        session,
        ViewportBridge::new(Box::new(TerminalViewport)),
        Box::new(TokioSettleTimer::new(events.clone())),
        config.settle_delay,
    );

    let _raw_mode = if std::io::stdin().is_terminal() {
        Some(RawModeGuard::enable().context("failed to enable raw terminal mode")?)
    } else {
        None
    };

    spawn_stdin_reader(events.clone());
    spawn_resize_watcher(events.clone());

    // Only reachable when stdin is not a terminal; in raw mode Ctrl+C is a
    // keystroke for the remote shell.
    let interrupt = events.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = interrupt.send(ClientEvent::Disconnect);
            }
            Err(e) => warn!("failed to listen for Ctrl+C: {e}"),
        }
    });

    events
        .send(ClientEvent::Connect(credentials))
        .context("event queue closed before connect")?;
    events
        .send(ClientEvent::Layout)
        .context("event queue closed before connect")?;

    // ── Run ───────────────────────────────────────────────────────────────────
    let state = drive(&mut client, &mut queue).await;
    info!("session finished in state {state:?}");

    match client.last_error() {
        Some(error) => Err(anyhow::Error::new(error.clone()).context("session ended")),
        None if state == SessionState::Closed => Ok(()),
        None => anyhow::bail!("event queue ended before the session closed"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
