//! Drains the client's event queue into [`TerminalClient::handle`].
//!
//! Every event source (channel tasks, stdin, window changes, timers) holds a
//! sender for the same unbounded queue.  This loop is its only receiver, so
//! events are handled one at a time in the order they were queued.

use tokio::sync::mpsc;
use tracing::debug;

use crate::application::{ClientEvent, SessionState, TerminalClient};

/// Handles events until `done` returns `true` or the queue ends.
///
/// `done` is checked before the first event and after each one.  Returns
/// whether `done` was satisfied.
pub async fn run_until<F>(
    client: &mut TerminalClient,
    events: &mut mpsc::UnboundedReceiver<ClientEvent>,
    mut done: F,
) -> bool
where
    F: FnMut(&TerminalClient) -> bool,
{
    if done(client) {
        return true;
    }
    while let Some(event) = events.recv().await {
        client.handle(event);
        if done(client) {
            return true;
        }
    }
    debug!("event queue ended");
    false
}

/// Runs the client until its session is Closed.
///
/// Returns the final state, which is `Closed` unless the queue ended first.
pub async fn drive(
    client: &mut TerminalClient,
    events: &mut mpsc::UnboundedReceiver<ClientEvent>,
) -> SessionState {
    run_until(client, events, |c| c.state() == SessionState::Closed).await;
    client.state()
}
