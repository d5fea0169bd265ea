//! WebSocket relay connection.

use crate::backoff::ReconnectPolicy;
use crate::events::RelayEvent;
use crate::frame::Frame;
use crate::router::route;
use crate::tracker::{RelayState, RoomTracker};
use crate::{RelayError, RelayResult};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use url::Url;

/// WebSocket path on the relay server.
pub const CHAT_PATH: &str = "/chat/ws";

/// Relay connection configuration.
#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    pub reconnect: ReconnectPolicy,
}

struct Shared {
    tracker: RoomTracker,
    writer: Option<mpsc::UnboundedSender<Message>>,
}

/// Persistent relay connection.
///
/// Socket callbacks run on a background task. Everything meant for the
/// host is pushed onto the event queue handed to [`RelayConnection::new`].
pub struct RelayConnection {
    config: RelayConfig,
    shared: Arc<Mutex<Shared>>,
    events: mpsc::UnboundedSender<RelayEvent>,
    task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl RelayConnection {
    /// Create a connection that reports to `events`.
    pub fn new(config: RelayConfig, events: mpsc::UnboundedSender<RelayEvent>) -> Self {
        Self {
            config,
            shared: Arc::new(Mutex::new(Shared {
                tracker: RoomTracker::new(),
                writer: None,
            })),
            events,
            task: parking_lot::Mutex::new(None),
        }
    }

    /// Create a connection together with the receiving end of its event queue.
    pub fn channel(config: RelayConfig) -> (Self, mpsc::UnboundedReceiver<RelayEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(config, tx), rx)
    }

    /// Current connection state.
    pub async fn state(&self) -> RelayState {
        self.shared.lock().await.tracker.state().clone()
    }

    /// Start connecting in the background.
    ///
    /// Returns once the socket task is spawned. Calling this while already
    /// connecting or connected does nothing.
    pub async fn connect(&self, server_url: &str, token: &str) -> RelayResult<()> {
        let ws_url = ws_url(server_url)?;
        build_request(&ws_url, token)?;

        {
            let mut shared = self.shared.lock().await;
            if !shared.tracker.begin_connect() {
                debug!("Already connecting or connected");
                return Ok(());
            }
            self.emit(RelayEvent::StateChanged(RelayState::Connecting));
        }
        info!(url = %ws_url, "Connecting to relay");

        let handle = tokio::spawn(run(
            ws_url,
            token.to_string(),
            self.config.reconnect,
            self.shared.clone(),
            self.events.clone(),
        ));
        if let Some(previous) = self.task.lock().replace(handle) {
            previous.abort();
        }

        Ok(())
    }

    /// Join `room`, leaving the current one first.
    pub async fn join(&self, room: &str) {
        self.apply(|tracker| tracker.join(room)).await;
    }

    /// Leave the current room.
    pub async fn leave(&self) {
        self.apply(|tracker| tracker.leave()).await;
    }

    /// Send a message to the global channel.
    pub async fn send_global(&self, text: &str) {
        self.apply(|tracker| tracker.send_global(text)).await;
    }

    /// Send a message to the current room.
    pub async fn send_local(&self, text: &str) {
        self.apply(|tracker| tracker.send_local(text)).await;
    }

    /// Close the socket and stop reconnecting.
    pub async fn disconnect(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }

        let mut shared = self.shared.lock().await;
        shared.writer = None;
        let was_active = shared.tracker.state() != &RelayState::Disconnected;
        shared.tracker.on_disconnect();

        if was_active {
            info!("Disconnected from relay");
            self.emit(RelayEvent::StateChanged(RelayState::Disconnected));
        }
    }

    /// Run a tracker operation and send its frames.
    ///
    /// The state event is queued while the lock is held so concurrent
    /// callers cannot reorder transitions.
    async fn apply(&self, op: impl FnOnce(&mut RoomTracker) -> Vec<Frame>) {
        let mut shared = self.shared.lock().await;
        let before = shared.tracker.state().clone();
        let frames = op(&mut shared.tracker);
        if let Some(writer) = &shared.writer {
            for frame in &frames {
                transmit(writer, frame);
            }
        }

        let after = shared.tracker.state();
        if &before != after {
            self.emit(RelayEvent::StateChanged(after.clone()));
        }
    }

    fn emit(&self, event: RelayEvent) {
        if self.events.send(event).is_err() {
            debug!("Event queue closed");
        }
    }
}

impl Drop for RelayConnection {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

/// Derive the relay WebSocket URL from the HTTP server URL.
///
/// `https` maps to `wss`, every other scheme to `ws`. The path is replaced
/// with [`CHAT_PATH`].
pub fn ws_url(server_url: &str) -> RelayResult<Url> {
    let invalid = |reason: &str| {
        RelayError::ConnectFailure(format!("invalid server url {}: {}", server_url, reason))
    };

    let mut url = Url::parse(server_url).map_err(|e| invalid(&e.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("missing host"));
    }

    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme)
        .map_err(|_| invalid("unsupported scheme"))?;
    url.set_path(CHAT_PATH);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

fn build_request(ws_url: &Url, token: &str) -> RelayResult<Request> {
    let mut request = ws_url
        .as_str()
        .into_client_request()
        .map_err(|e| RelayError::ConnectFailure(e.to_string()))?;
    let header = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| RelayError::ConnectFailure(format!("invalid token: {}", e)))?;
    request.headers_mut().insert(AUTHORIZATION, header);
    Ok(request)
}

fn transmit(writer: &mpsc::UnboundedSender<Message>, frame: &Frame) {
    match frame.to_json() {
        Ok(json) => {
            debug!(frame_type = i64::from(frame.frame_type), "Sending frame");
            if writer.send(Message::Text(json.into())).is_err() {
                warn!("Relay writer closed, frame dropped");
            }
        }
        Err(e) => warn!(error = %e, "Failed to encode frame"),
    }
}

/// Connect, serve, and reconnect until the tracker is shut down.
async fn run(
    ws_url: Url,
    token: String,
    policy: ReconnectPolicy,
    shared: Arc<Mutex<Shared>>,
    events: mpsc::UnboundedSender<RelayEvent>,
) {
    let mut failures: u32 = 0;

    loop {
        let attempt = match build_request(&ws_url, &token) {
            Ok(request) => connect_async(request).await.map_err(RelayError::from),
            Err(e) => Err(e),
        };

        match attempt {
            Ok((stream, _)) => {
                failures = 0;
                run_session(stream, &shared, &events).await;
            }
            Err(e) => warn!(error = %e, "Relay connect failed"),
        }

        {
            let mut guard = shared.lock().await;
            guard.writer = None;
            let before = guard.tracker.state().clone();
            if !guard.tracker.on_close() {
                return;
            }
            let after = guard.tracker.state();
            if &before != after {
                let _ = events.send(RelayEvent::StateChanged(after.clone()));
            }
        }

        failures = failures.saturating_add(1);
        let delay = policy.jittered_delay(failures);
        info!(
            attempt = failures,
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

async fn run_session(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    shared: &Mutex<Shared>,
    events: &mpsc::UnboundedSender<RelayEvent>,
) {
    let (mut write, mut read) = stream.split();
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Message>();

    let writer_handle = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            if write.send(msg).await.is_err() {
                break;
            }
        }
        let _ = write.close().await;
    });

    {
        let mut guard = shared.lock().await;
        let frames = guard.tracker.on_open();
        let state = guard.tracker.state().clone();
        if !state.is_open() {
            writer_handle.abort();
            return;
        }
        for frame in &frames {
            transmit(&msg_tx, frame);
        }
        guard.writer = Some(msg_tx.clone());
        info!(state = %state, "Connected to relay");
        let _ = events.send(RelayEvent::StateChanged(state));
    }

    while let Some(msg_result) = read.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                if let Some(event) = route(text.as_str()) {
                    let _ = events.send(event);
                }
            }
            Ok(Message::Close(frame)) => {
                info!(frame = ?frame, "Relay connection closed");
                break;
            }
            // Pings are answered by tungstenite on the next read or write.
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "WebSocket error");
                break;
            }
        }
    }

    drop(msg_tx);
    writer_handle.abort();
}
