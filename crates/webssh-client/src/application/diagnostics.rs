//! Status lines written into the terminal surface.
//!
//! Each line starts and ends with CRLF so it lands on its own row regardless
//! of where the remote shell left the cursor, and resets SGR attributes so the
//! color does not bleed into later output.

use crate::application::session::{SessionError, TransportError};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Written when the gateway acknowledges the session.
pub fn connected() -> String {
    colored_line(GREEN, "Connected to SSH server")
}

/// Written when a session ends because of `error`.
pub fn session_ended(error: &SessionError) -> String {
    let text = match error {
        SessionError::Remote(reason) => format!("Error: {reason}"),
        SessionError::Transport(TransportError::ClosedByRemote) => "Connection closed".to_string(),
        SessionError::Transport(TransportError::Failed(reason)) => {
            format!("Connection error: {reason}")
        }
        SessionError::Transport(other) => format!("Connection error: {other}"),
        SessionError::Encode(err) => format!("Error: {err}"),
    };
    colored_line(RED, &text)
}

fn colored_line(color: &str, text: &str) -> String {
    format!("\r\n{color}{text}{RESET}\r\n")
}
