//! Relay authentication client.

use crate::error::{AuthError, AuthResult};
use crate::identity::{Identity, Session};
use crate::verifier::{verification_digest, SessionVerifier};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// Body of both `/auth/begin` and `/auth/verify` responses.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Build `{server}{path}`, replacing whatever path and query the server URL had.
pub fn endpoint(server_url: &Url, path: &str) -> Url {
    let mut url = server_url.clone();
    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// Performs the relay handshake once and caches the resulting session.
pub struct AuthClient {
    http_client: reqwest::Client,
    server_url: Url,
    verifier: Arc<dyn SessionVerifier>,
    session: Mutex<Option<Session>>,
}

impl AuthClient {
    /// Create a client for the relay at `server_url`.
    pub fn new(server_url: Url, verifier: Arc<dyn SessionVerifier>) -> Self {
        Self::with_client(reqwest::Client::new(), server_url, verifier)
    }

    /// Create a client sharing an existing HTTP client.
    pub fn with_client(
        http_client: reqwest::Client,
        server_url: Url,
        verifier: Arc<dyn SessionVerifier>,
    ) -> Self {
        Self {
            http_client,
            server_url,
            verifier,
            session: Mutex::new(None),
        }
    }

    /// The relay base URL this client talks to.
    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// Authenticate `identity`, or return the cached session.
    ///
    /// Concurrent callers are serialized; only the first performs the
    /// handshake. On failure nothing is cached.
    pub async fn authenticate(&self, identity: &Identity) -> AuthResult<Session> {
        let mut cached = self.session.lock().await;
        if let Some(session) = cached.as_ref() {
            tracing::debug!(identity = %session.identity, "Using cached relay session");
            return Ok(session.clone());
        }

        match self.handshake(identity).await {
            Ok(session) => {
                tracing::info!(identity = %session.identity, "Authenticated with relay");
                *cached = Some(session.clone());
                Ok(session)
            }
            Err(e) => {
                *cached = None;
                tracing::error!(identity = %identity.name, error = %e, "Failed to authorize");
                Err(e)
            }
        }
    }

    /// The cached session token, if authenticated.
    pub async fn token(&self) -> Option<String> {
        self.session.lock().await.as_ref().map(|s| s.token.clone())
    }

    /// Drop the cached session so the next `authenticate` handshakes again.
    pub async fn clear(&self) {
        *self.session.lock().await = None;
    }

    async fn handshake(&self, identity: &Identity) -> AuthResult<Session> {
        let begin_url = endpoint(&self.server_url, "/auth/begin");
        tracing::debug!(url = %begin_url, "Beginning relay handshake");
        let begin_token = Self::read_token(
            self.http_client
                .post(begin_url)
                .form(&[("username", identity.name.as_str())]),
        )
        .await?;

        self.verifier
            .join_server(identity, &verification_digest(&begin_token))
            .await?;

        let verify_url = endpoint(&self.server_url, "/auth/verify");
        tracing::debug!(url = %verify_url, "Verifying relay handshake");
        let token = Self::read_token(
            self.http_client
                .post(verify_url)
                .bearer_auth(&begin_token),
        )
        .await?;

        Ok(Session {
            identity: identity.name.clone(),
            token,
        })
    }

    async fn read_token(request: reqwest::RequestBuilder) -> AuthResult<String> {
        let response = request.send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AuthError::BadStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        Ok(parsed.token)
    }
}
