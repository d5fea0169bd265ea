//! Authentication and link error types.

use thiserror::Error;

/// Handshake failure. Any variant leaves the client without a token.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The relay answered with something other than 200
    #[error("Received invalid status code {0}")]
    BadStatus(u16),

    /// Connection, TLS or body read failure
    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    /// Body was not the expected `{ "token": ... }` JSON
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The session server refused to vouch for the identity
    #[error("Session verification failed: {0}")]
    Verification(String),
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

/// Link management failure.
#[derive(Error, Debug)]
pub enum LinkError {
    /// Code does not exist, expired, or was not used by this account
    #[error("Link code not found")]
    NotFound,

    /// Session token missing, expired or rejected
    #[error("Not authorized")]
    Unauthorized,

    /// Any other non-200 status
    #[error("Received invalid status code {0}")]
    BadStatus(u16),

    /// Connection, TLS or body read failure
    #[error("Network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// Body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl LinkError {
    /// Map a non-success HTTP status to a link error.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 404 => LinkError::NotFound,
            401 | 403 => LinkError::Unauthorized,
            other => LinkError::BadStatus(other),
        }
    }
}

/// Result type alias using LinkError.
pub type LinkResult<T> = Result<T, LinkError>;
