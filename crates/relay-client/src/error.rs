//! Relay error types.

use thiserror::Error;

/// Relay error type.
///
/// None of these are fatal to the host: transport errors end in a
/// reconnect and protocol errors only discard the offending frame.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The socket could not be set up (bad URL, bad token header)
    #[error("Connect failure: {0}")]
    ConnectFailure(String),

    /// WebSocket I/O failure
    #[error("Transport error: {0}")]
    TransportError(#[from] tokio_tungstenite::tungstenite::Error),

    /// Frame that is not valid JSON or not a `{type, args}` object
    #[error("Protocol error: {0}")]
    ProtocolError(String),
}

/// Result type alias using RelayError.
pub type RelayResult<T> = Result<T, RelayError>;
