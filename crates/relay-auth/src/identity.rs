//! Player identity and relay session.

use std::fmt;

/// The player account the host is signed in with.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    /// Player name, sent to `/auth/begin`.
    pub name: String,
    /// Profile UUID, dashes optional.
    pub uuid: String,
    /// Game session access token, only ever shown to the session server.
    pub access_token: String,
}

impl Identity {
    pub fn new(
        name: impl Into<String>,
        uuid: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            uuid: uuid.into(),
            access_token: access_token.into(),
        }
    }

    /// UUID in the undashed form the session server expects.
    pub fn undashed_uuid(&self) -> String {
        self.uuid.replace('-', "")
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("name", &self.name)
            .field("uuid", &self.uuid)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// An authenticated relay session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Player name the session was issued for.
    pub identity: String,
    /// Long-lived bearer token returned by `/auth/verify`.
    pub token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
