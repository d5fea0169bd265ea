//! Session server verification.
//!
//! The relay cannot see the player's game credentials. Instead the client
//! tells the session server it is "joining" a server whose id is the SHA-1
//! of the relay's begin token; the relay then asks the session server
//! whether that player joined that id.

use crate::error::{AuthError, AuthResult};
use crate::identity::Identity;
use async_trait::async_trait;
use sha1::{Digest, Sha1};

/// Lowercase hex SHA-1 of the begin token, used as the session server id.
pub fn verification_digest(token: &str) -> String {
    hex::encode(Sha1::digest(token.as_bytes()))
}

/// Proves to the platform that `identity` is claiming `server_id`.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn join_server(&self, identity: &Identity, server_id: &str) -> AuthResult<()>;
}

/// Verifier backed by the Mojang session server `join` endpoint.
#[derive(Clone)]
pub struct MojangSessionVerifier {
    http_client: reqwest::Client,
    base_url: String,
}

impl MojangSessionVerifier {
    /// Create a verifier for the given session server base URL
    /// (e.g. `https://sessionserver.mojang.com`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a verifier sharing an existing HTTP client.
    pub fn with_client(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    fn join_url(&self) -> String {
        format!(
            "{}/session/minecraft/join",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl SessionVerifier for MojangSessionVerifier {
    async fn join_server(&self, identity: &Identity, server_id: &str) -> AuthResult<()> {
        tracing::debug!(player = %identity.name, "Joining session server");

        let response = self
            .http_client
            .post(self.join_url())
            .json(&serde_json::json!({
                "accessToken": identity.access_token,
                "selectedProfile": identity.undashed_uuid(),
                "serverId": server_id,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Session server rejected join");
            return Err(AuthError::Verification(format!(
                "session server returned {}",
                status
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn identity() -> Identity {
        Identity::new("Alice", "069a79f4-44e9-4726-a5be-fca90e38aaf5", "game-access-token")
    }

    #[test]
    fn test_verification_digest_known_vector() {
        assert_eq!(
            verification_digest("abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(verification_digest("abc").len(), 40);
    }

    #[test]
    fn test_join_url_trims_trailing_slash() {
        let verifier = MojangSessionVerifier::new("https://sessionserver.mojang.com/");
        assert_eq!(
            verifier.join_url(),
            "https://sessionserver.mojang.com/session/minecraft/join"
        );
    }

    #[tokio::test]
    async fn test_join_server_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/session/minecraft/join"))
            .and(body_json(serde_json::json!({
                "accessToken": "game-access-token",
                "selectedProfile": "069a79f444e94726a5befca90e38aaf5",
                "serverId": "a9993e364706816aba3e25717850c26c9cd0d89d",
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let verifier = MojangSessionVerifier::new(server.uri());
        verifier
            .join_server(&identity(), &verification_digest("abc"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_join_server_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let verifier = MojangSessionVerifier::new(server.uri());
        let result = verifier.join_server(&identity(), "digest").await;
        assert!(matches!(result, Err(AuthError::Verification(_))));
    }
}
