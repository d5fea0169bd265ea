//! Inbound frame dispatch.

use crate::events::{ChatLine, RelayEvent};
use crate::frame::{Frame, FrameType};
use tracing::{debug, error, warn};

/// Decode one inbound text message and decide what the host should see.
///
/// Returns `None` for frames that only get logged: acks, malformed JSON,
/// unknown or client-only types. Nothing here tears the connection down.
pub fn route(text: &str) -> Option<RelayEvent> {
    match Frame::from_json(text) {
        Ok(frame) => route_frame(frame),
        Err(e) => {
            warn!(error = %e, "Discarding malformed relay frame");
            None
        }
    }
}

/// Dispatch an already decoded frame.
pub fn route_frame(frame: Frame) -> Option<RelayEvent> {
    match frame.frame_type {
        FrameType::Error => {
            let message = frame.arg(0).unwrap_or("unknown error").to_string();
            error!(message = %message, "Received error from relay");
            Some(RelayEvent::Error(message))
        }
        FrameType::Ack => {
            debug!("Received ack");
            None
        }
        FrameType::LocalMsg => {
            let (Some(sender), Some(body)) = (frame.arg(0), frame.arg(1)) else {
                warn!(args = frame.args.len(), "Discarding local message with missing args");
                return None;
            };
            let reply_to = frame.arg(2);
            Some(RelayEvent::LocalMessage {
                sender: sender.to_string(),
                lines: render_local(sender, body, reply_to),
                reply_to: reply_to.map(str::to_string),
            })
        }
        other => {
            warn!(frame_type = i64::from(other), "Received invalid type");
            None
        }
    }
}

/// Split a local message into chat lines.
///
/// The body is trimmed and split on newlines. The first line carries the
/// sender, later lines are continuations. A reply quote goes on top.
pub fn render_local(sender: &str, body: &str, reply_to: Option<&str>) -> Vec<ChatLine> {
    let mut lines = Vec::new();

    if let Some(quoted) = reply_to {
        lines.push(ChatLine::ReplyingTo(quoted.to_string()));
    }

    for (index, line) in body.trim().split('\n').enumerate() {
        if index == 0 {
            lines.push(ChatLine::Message {
                sender: sender.to_string(),
                text: line.to_string(),
            });
        } else {
            lines.push(ChatLine::Continuation(line.to_string()));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(sender: &str, text: &str) -> ChatLine {
        ChatLine::Message {
            sender: sender.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_multiline_local_message() {
        let event = route(r#"{"type":5,"args":["Alice","hi\nthere"]}"#).unwrap();

        assert_eq!(
            event,
            RelayEvent::LocalMessage {
                sender: "Alice".to_string(),
                lines: vec![
                    message("Alice", "hi"),
                    ChatLine::Continuation("there".to_string()),
                ],
                reply_to: None,
            }
        );
    }

    #[test]
    fn test_reply_goes_first() {
        let event = route(r#"{"type":5,"args":["Bob","ok","original text"]}"#).unwrap();

        let RelayEvent::LocalMessage {
            lines, reply_to, ..
        } = event
        else {
            panic!("expected a local message");
        };
        assert_eq!(reply_to.as_deref(), Some("original text"));
        assert_eq!(
            lines,
            vec![
                ChatLine::ReplyingTo("original text".to_string()),
                message("Bob", "ok"),
            ]
        );
    }

    #[test]
    fn test_body_is_trimmed() {
        let lines = render_local("Carol", "\n  first\nsecond  \n", None);
        assert_eq!(
            lines,
            vec![
                message("Carol", "first"),
                ChatLine::Continuation("second".to_string()),
            ]
        );
    }

    #[test]
    fn test_error_frame() {
        assert_eq!(
            route(r#"{"type":0,"args":["Join a server first"]}"#),
            Some(RelayEvent::Error("Join a server first".to_string()))
        );
        assert_eq!(
            route(r#"{"type":0,"args":[]}"#),
            Some(RelayEvent::Error("unknown error".to_string()))
        );
    }

    #[test]
    fn test_discarded_frames() {
        for text in [
            r#"{"type":1,"args":[]}"#,
            r#"{"type":99,"args":["future"]}"#,
            r#"{"type":-1,"args":[]}"#,
            r#"{"type":2,"args":["client only"]}"#,
            r#"{"type":5,"args":["sender only"]}"#,
            r#"[5,["Mallory","hi"]]"#,
            "garbage",
            "",
        ] {
            assert_eq!(route(text), None, "expected {:?} to be discarded", text);
        }
    }
}
