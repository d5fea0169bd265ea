//! Events delivered to the host.
//!
//! The connection never renders anything itself. It pushes [`RelayEvent`]s
//! onto the host's queue and the host drains them on its own thread,
//! optionally through a [`RelayObserver`].

use crate::tracker::RelayState;

/// One rendered line of a local chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatLine {
    /// "replying to" header shown above the message body.
    ReplyingTo(String),
    /// First body line, prefixed with the sender.
    Message { sender: String, text: String },
    /// Every further body line.
    Continuation(String),
}

/// Events emitted by the relay connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// A local-channel message from another player or Discord.
    LocalMessage {
        sender: String,
        lines: Vec<ChatLine>,
        reply_to: Option<String>,
    },
    /// The relay reported an error.
    Error(String),
    /// The connection state changed.
    StateChanged(RelayState),
}

impl RelayEvent {
    /// Hand this event to the matching observer callback.
    pub fn dispatch<O: RelayObserver + ?Sized>(&self, observer: &mut O) {
        match self {
            RelayEvent::LocalMessage {
                sender,
                lines,
                reply_to,
            } => observer.on_local_message(sender, lines, reply_to.as_deref()),
            RelayEvent::Error(message) => observer.on_error(message),
            RelayEvent::StateChanged(state) => observer.on_connection_state_changed(state),
        }
    }
}

/// Host-side callbacks. Every method defaults to doing nothing.
pub trait RelayObserver {
    fn on_local_message(&mut self, _sender: &str, _lines: &[ChatLine], _reply_to: Option<&str>) {}

    fn on_error(&mut self, _message: &str) {}

    fn on_connection_state_changed(&mut self, _state: &RelayState) {}
}
