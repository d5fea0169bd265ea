//! Connection and room state machine.
//!
//! [`RoomTracker`] decides which frames go on the wire for every host call
//! and socket event. It does no I/O; the connection feeds it events and
//! writes whatever it returns.

use crate::frame::Frame;
use std::fmt;

/// Connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayState {
    Disconnected,
    Connecting,
    Open,
    Joined(String),
}

impl RelayState {
    /// True when frames may be written to the socket.
    pub fn is_open(&self) -> bool {
        matches!(self, RelayState::Open | RelayState::Joined(_))
    }

    /// The joined room, if any.
    pub fn room(&self) -> Option<&str> {
        match self {
            RelayState::Joined(room) => Some(room),
            _ => None,
        }
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayState::Disconnected => write!(f, "disconnected"),
            RelayState::Connecting => write!(f, "connecting"),
            RelayState::Open => write!(f, "open"),
            RelayState::Joined(room) => write!(f, "joined({})", room),
        }
    }
}

/// Tracks the relay state plus the room to (re)join once the socket opens.
#[derive(Debug)]
pub struct RoomTracker {
    state: RelayState,
    pending_room: Option<String>,
}

impl Default for RoomTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomTracker {
    pub fn new() -> Self {
        Self {
            state: RelayState::Disconnected,
            pending_room: None,
        }
    }

    pub fn state(&self) -> &RelayState {
        &self.state
    }

    /// Disconnected → Connecting. Returns false if a connection is already
    /// being made or is up.
    pub fn begin_connect(&mut self) -> bool {
        if self.state != RelayState::Disconnected {
            return false;
        }
        self.state = RelayState::Connecting;
        true
    }

    /// The socket opened. Re-joins the remembered room, if any.
    pub fn on_open(&mut self) -> Vec<Frame> {
        if self.state != RelayState::Connecting {
            return Vec::new();
        }

        match self.pending_room.take() {
            Some(room) => {
                let frames = vec![Frame::join_room(&room)];
                self.state = RelayState::Joined(room);
                frames
            }
            None => {
                self.state = RelayState::Open;
                Vec::new()
            }
        }
    }

    /// The socket closed or failed. Returns false when the tracker was shut
    /// down and no reconnect should follow.
    pub fn on_close(&mut self) -> bool {
        match std::mem::replace(&mut self.state, RelayState::Connecting) {
            RelayState::Disconnected => {
                self.state = RelayState::Disconnected;
                false
            }
            RelayState::Joined(room) => {
                self.pending_room = Some(room);
                true
            }
            RelayState::Connecting | RelayState::Open => true,
        }
    }

    /// Host shutdown: forget everything, stop reconnecting.
    pub fn on_disconnect(&mut self) {
        self.state = RelayState::Disconnected;
        self.pending_room = None;
    }

    /// Join `room`, leaving the current room first.
    pub fn join(&mut self, room: &str) -> Vec<Frame> {
        match &self.state {
            RelayState::Disconnected => Vec::new(),
            RelayState::Connecting => {
                self.pending_room = Some(room.to_string());
                Vec::new()
            }
            RelayState::Joined(current) if current == room => Vec::new(),
            RelayState::Joined(_) => {
                let frames = vec![Frame::leave_room(), Frame::join_room(room)];
                self.state = RelayState::Joined(room.to_string());
                frames
            }
            RelayState::Open => {
                self.state = RelayState::Joined(room.to_string());
                vec![Frame::join_room(room)]
            }
        }
    }

    /// Leave the current room. While connecting this only drops the
    /// remembered room.
    pub fn leave(&mut self) -> Vec<Frame> {
        match &self.state {
            RelayState::Joined(_) => {
                self.state = RelayState::Open;
                vec![Frame::leave_room()]
            }
            RelayState::Connecting => {
                self.pending_room = None;
                Vec::new()
            }
            RelayState::Disconnected | RelayState::Open => Vec::new(),
        }
    }

    pub fn send_global(&self, text: &str) -> Vec<Frame> {
        self.when_open(|| Frame::global_msg(text))
    }

    /// Local messages go out whenever the socket is open; the relay answers
    /// with an Error frame if no room is joined.
    pub fn send_local(&self, text: &str) -> Vec<Frame> {
        self.when_open(|| Frame::local_msg(text))
    }

    fn when_open(&self, make: impl FnOnce() -> Frame) -> Vec<Frame> {
        if self.state.is_open() {
            vec![make()]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameType;

    fn open_tracker() -> RoomTracker {
        let mut tracker = RoomTracker::new();
        assert!(tracker.begin_connect());
        assert!(tracker.on_open().is_empty());
        tracker
    }

    fn types(frames: &[Frame]) -> Vec<FrameType> {
        frames.iter().map(|f| f.frame_type).collect()
    }

    #[test]
    fn test_initial_state() {
        let tracker = RoomTracker::new();
        assert_eq!(tracker.state(), &RelayState::Disconnected);
        assert!(tracker.pending_room.as_deref().is_none());
    }

    #[test]
    fn test_begin_connect_only_from_disconnected() {
        let mut tracker = RoomTracker::new();
        assert!(tracker.begin_connect());
        assert!(!tracker.begin_connect());
        tracker.on_open();
        assert!(!tracker.begin_connect());
        assert_eq!(tracker.state(), &RelayState::Open);
    }

    #[test]
    fn test_everything_is_dropped_while_disconnected() {
        let mut tracker = RoomTracker::new();

        assert!(tracker.join("A").is_empty());
        assert!(tracker.leave().is_empty());
        assert!(tracker.send_global("hi").is_empty());
        assert!(tracker.send_local("hi").is_empty());

        assert_eq!(tracker.state(), &RelayState::Disconnected);
        assert!(tracker.pending_room.as_deref().is_none());
    }

    #[test]
    fn test_join_from_open() {
        let mut tracker = open_tracker();
        let frames = tracker.join("A");

        assert_eq!(frames, vec![Frame::join_room("A")]);
        assert_eq!(tracker.state(), &RelayState::Joined("A".to_string()));
    }

    #[test]
    fn test_switching_rooms_leaves_first() {
        let mut tracker = open_tracker();
        tracker.join("A");

        let frames = tracker.join("B");
        assert_eq!(frames, vec![Frame::leave_room(), Frame::join_room("B")]);
        assert_eq!(tracker.state().room(), Some("B"));
    }

    #[test]
    fn test_rejoining_same_room_is_noop() {
        let mut tracker = open_tracker();
        let first = tracker.join("A");
        let second = tracker.join("A");

        assert_eq!(types(&first), vec![FrameType::JoinRoom]);
        assert!(second.is_empty());
    }

    #[test]
    fn test_leave() {
        let mut tracker = open_tracker();
        assert!(tracker.leave().is_empty());

        tracker.join("A");
        assert_eq!(tracker.leave(), vec![Frame::leave_room()]);
        assert_eq!(tracker.state(), &RelayState::Open);
        assert!(tracker.leave().is_empty());
    }

    #[test]
    fn test_sends_need_open_socket_only() {
        let mut tracker = open_tracker();
        assert_eq!(tracker.send_global("g"), vec![Frame::global_msg("g")]);
        assert_eq!(tracker.send_local("l"), vec![Frame::local_msg("l")]);

        tracker.join("A");
        assert_eq!(tracker.send_local("l"), vec![Frame::local_msg("l")]);
    }

    #[test]
    fn test_join_while_connecting_is_remembered() {
        let mut tracker = RoomTracker::new();
        tracker.begin_connect();

        assert!(tracker.join("A").is_empty());
        assert!(tracker.send_global("dropped").is_empty());
        assert_eq!(tracker.pending_room.as_deref(), Some("A"));

        assert_eq!(tracker.on_open(), vec![Frame::join_room("A")]);
        assert_eq!(tracker.state().room(), Some("A"));
        assert!(tracker.pending_room.as_deref().is_none());
    }

    #[test]
    fn test_leave_while_connecting_forgets_room() {
        let mut tracker = RoomTracker::new();
        tracker.begin_connect();
        tracker.join("A");
        tracker.leave();

        assert!(tracker.on_open().is_empty());
        assert_eq!(tracker.state(), &RelayState::Open);
    }

    #[test]
    fn test_close_remembers_room_and_reopen_rejoins() {
        let mut tracker = open_tracker();
        tracker.join("A");

        assert!(tracker.on_close());
        assert_eq!(tracker.state(), &RelayState::Connecting);
        assert_eq!(tracker.pending_room.as_deref(), Some("A"));

        assert_eq!(tracker.on_open(), vec![Frame::join_room("A")]);
        assert_eq!(tracker.state().room(), Some("A"));
    }

    #[test]
    fn test_close_from_open_and_connecting() {
        let mut tracker = open_tracker();
        assert!(tracker.on_close());
        assert_eq!(tracker.state(), &RelayState::Connecting);

        // A failed attempt while connecting schedules another one.
        assert!(tracker.on_close());
        assert_eq!(tracker.state(), &RelayState::Connecting);
    }

    #[test]
    fn test_disconnect_stops_reconnect() {
        let mut tracker = open_tracker();
        tracker.join("A");
        tracker.on_disconnect();

        assert_eq!(tracker.state(), &RelayState::Disconnected);
        assert!(!tracker.on_close());
        assert_eq!(tracker.state(), &RelayState::Disconnected);
        assert!(tracker.on_open().is_empty());
        assert!(tracker.pending_room.as_deref().is_none());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(RelayState::Connecting.to_string(), "connecting");
        assert_eq!(
            RelayState::Joined("1.2.3.4:25565".to_string()).to_string(),
            "joined(1.2.3.4:25565)"
        );
    }
}
