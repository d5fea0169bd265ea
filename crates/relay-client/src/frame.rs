//! Relay protocol frames.
//!
//! Every WebSocket text message is one JSON object
//! `{"type": <int>, "args": [<string>, ...]}`.

use crate::error::{RelayError, RelayResult};
use serde::{Deserialize, Serialize};

/// Frame type tag. Unrecognized integers decode to [`FrameType::Unknown`]
/// so that a newer server never breaks decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum FrameType {
    /// Server → client: `[message]`
    Error,
    /// Server → client: `[]`
    Ack,
    /// Client → server: `[room]`
    JoinRoom,
    /// Client → server: `[]`
    LeaveRoom,
    /// Client → server: `[text]`
    GlobalMsg,
    /// Both ways: client sends `[text]`, server sends `[sender, text, (reply_to)]`
    LocalMsg,
    Unknown(i64),
}

impl From<i64> for FrameType {
    fn from(code: i64) -> Self {
        match code {
            0 => FrameType::Error,
            1 => FrameType::Ack,
            2 => FrameType::JoinRoom,
            3 => FrameType::LeaveRoom,
            4 => FrameType::GlobalMsg,
            5 => FrameType::LocalMsg,
            other => FrameType::Unknown(other),
        }
    }
}

impl From<FrameType> for i64 {
    fn from(frame_type: FrameType) -> Self {
        match frame_type {
            FrameType::Error => 0,
            FrameType::Ack => 1,
            FrameType::JoinRoom => 2,
            FrameType::LeaveRoom => 3,
            FrameType::GlobalMsg => 4,
            FrameType::LocalMsg => 5,
            FrameType::Unknown(code) => code,
        }
    }
}

/// A frame sent to/from the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "type")]
    pub frame_type: FrameType,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Frame {
    /// Create a frame with the given arguments.
    pub fn new(frame_type: FrameType, args: Vec<String>) -> Self {
        Self { frame_type, args }
    }

    /// Create a JoinRoom frame.
    pub fn join_room(room: &str) -> Self {
        Self::new(FrameType::JoinRoom, vec![room.to_string()])
    }

    /// Create a LeaveRoom frame.
    pub fn leave_room() -> Self {
        Self::new(FrameType::LeaveRoom, Vec::new())
    }

    /// Create a GlobalMsg frame.
    pub fn global_msg(text: &str) -> Self {
        Self::new(FrameType::GlobalMsg, vec![text.to_string()])
    }

    /// Create an outbound LocalMsg frame.
    pub fn local_msg(text: &str) -> Self {
        Self::new(FrameType::LocalMsg, vec![text.to_string()])
    }

    /// Argument at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string. Only a JSON object is a frame.
    pub fn from_json(json: &str) -> RelayResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| RelayError::ProtocolError(e.to_string()))?;
        if !value.is_object() {
            return Err(RelayError::ProtocolError(
                "frame is not a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| RelayError::ProtocolError(e.to_string()))
    }
}
