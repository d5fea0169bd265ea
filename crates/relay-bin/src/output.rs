//! Terminal rendering for relay output.

use crate::commands::Reply;
use relay_client::{ChatLine, RelayObserver, RelayState};
use std::io::Write;
use tracing::{info, warn};

const TAG: &str = "[GooberCord]";

/// Render one chat line with the terminal templates.
pub fn format_chat_line(line: &ChatLine) -> String {
    match line {
        ChatLine::ReplyingTo(text) => format!("  ↪ replying to: {}", text),
        ChatLine::Message { sender, text } => format!("[Local] <{}> {}", sender, text),
        ChatLine::Continuation(text) => format!("    {}", text),
    }
}

pub fn format_reply(reply: &Reply) -> String {
    match reply {
        Reply::Plain(text) => text.clone(),
        Reply::Tagged(text) => format!("{} {}", TAG, text),
    }
}

fn format_state(state: &RelayState) -> Option<String> {
    match state {
        RelayState::Open => Some(format!("{} Connected to relay", TAG)),
        RelayState::Joined(room) => Some(format!("{} Joined room {}", TAG, room)),
        RelayState::Connecting | RelayState::Disconnected => None,
    }
}

/// Prints relay events to a writer, normally stdout.
pub struct TerminalObserver<W: Write> {
    out: W,
}

impl<W: Write> TerminalObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn print(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            warn!(error = %e, "Failed to write output");
        }
    }

    pub fn print_replies(&mut self, replies: &[Reply]) {
        for reply in replies {
            self.print(&format_reply(reply));
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RelayObserver for TerminalObserver<W> {
    fn on_local_message(&mut self, _sender: &str, lines: &[ChatLine], _reply_to: Option<&str>) {
        for line in lines {
            self.print(&format_chat_line(line));
        }
    }

    fn on_error(&mut self, message: &str) {
        warn!(message = %message, "Relay reported an error");
    }

    fn on_connection_state_changed(&mut self, state: &RelayState) {
        info!(state = %state, "Relay state changed");
        if let Some(line) = format_state(state) {
            self.print(&line);
        }
    }
}
