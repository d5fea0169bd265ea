//! GooberCord relay client.
//!
//! Maintains a persistent WebSocket to the GooberCord relay, tracks which
//! room (Minecraft server address) the player is in, and turns inbound
//! frames into [`RelayEvent`]s for the host.
//!
//! Frames are JSON objects `{"type": <int>, "args": [<string>, ...]}`. The
//! socket lives on a background task and reconnects with backoff until
//! [`RelayConnection::disconnect`] is called.

mod backoff;
mod connection;
mod error;
mod events;
mod frame;
mod router;
mod tracker;

pub use backoff::ReconnectPolicy;
pub use connection::{ws_url, RelayConfig, RelayConnection, CHAT_PATH};
pub use error::{RelayError, RelayResult};
pub use events::{ChatLine, RelayEvent, RelayObserver};
pub use frame::{Frame, FrameType};
pub use router::{render_local, route, route_frame};
pub use tracker::{RelayState, RoomTracker};
