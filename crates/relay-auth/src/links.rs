//! Discord account link management.
//!
//! Link codes are handed out by the Discord bot; the player confirms them
//! from the game. The public calls collapse every failure into `false` or an
//! empty list, the `try_*` variants keep the reason.

use crate::client::endpoint;
use crate::error::{LinkError, LinkResult};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

/// A linking code and the Discord account/guild it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub code: String,
    pub user_id: u64,
    pub guild_id: u64,
    /// Player UUID once the code has been used.
    #[serde(default)]
    pub uuid: Option<String>,
    /// Expiry timestamp; absent once linked.
    #[serde(default)]
    pub expire_at: Option<String>,
}

/// Client for the `/discord` endpoints, bound to one session token.
#[derive(Clone)]
pub struct LinkClient {
    http_client: reqwest::Client,
    server_url: Url,
    token: String,
}

impl LinkClient {
    pub fn new(server_url: Url, token: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            server_url,
            token: token.into(),
        }
    }

    fn link_url(&self, code: &str) -> Url {
        let mut url = endpoint(&self.server_url, "/");
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.clear().extend(["discord", "link", code]);
        }
        url
    }

    /// Link this account using `code`. True on success.
    pub async fn link(&self, code: &str) -> bool {
        match self.try_link(code).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Link failed");
                false
            }
        }
    }

    /// Remove the link created with `code`. True on success.
    pub async fn unlink(&self, code: &str) -> bool {
        match self.try_unlink(code).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Unlink failed");
                false
            }
        }
    }

    /// All codes used by this account; empty on any failure.
    pub async fn links(&self) -> Vec<Link> {
        self.try_links().await.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Listing links failed");
            Vec::new()
        })
    }

    pub async fn try_link(&self, code: &str) -> LinkResult<()> {
        let response = self
            .http_client
            .put(self.link_url(code))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::expect_ok(response.status())
    }

    pub async fn try_unlink(&self, code: &str) -> LinkResult<()> {
        let response = self
            .http_client
            .delete(self.link_url(code))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::expect_ok(response.status())
    }

    pub async fn try_links(&self) -> LinkResult<Vec<Link>> {
        let response = self
            .http_client
            .get(endpoint(&self.server_url, "/discord/links"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::expect_ok(response.status())?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| LinkError::MalformedResponse(e.to_string()))
    }

    fn expect_ok(status: StatusCode) -> LinkResult<()> {
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(LinkError::from_status(status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> LinkClient {
        LinkClient::new(Url::parse(&server.uri()).unwrap(), "session-token")
    }

    #[test]
    fn test_link_url_encodes_code() {
        let client = LinkClient::new(Url::parse("https://gc.sussy.dev/").unwrap(), "t");
        assert_eq!(
            client.link_url("abc123").as_str(),
            "https://gc.sussy.dev/discord/link/abc123"
        );
        assert_eq!(
            client.link_url("a/b c").as_str(),
            "https://gc.sussy.dev/discord/link/a%2Fb%20c"
        );
    }

    #[test]
    fn test_link_deserialize() {
        let json = r#"[
            {"code":"deadbeef","userId":123456789012345678,"guildId":42,"uuid":"069a79f4","expireAt":null},
            {"code":"cafe","userId":1,"guildId":2,"uuid":null,"expireAt":"2024-05-01T10:00:00Z"}
        ]"#;
        let links: Vec<Link> = serde_json::from_str(json).unwrap();

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].user_id, 123456789012345678);
        assert_eq!(links[0].uuid.as_deref(), Some("069a79f4"));
        assert!(links[0].expire_at.is_none());
        assert_eq!(links[1].expire_at.as_deref(), Some("2024-05-01T10:00:00Z"));
    }

    #[tokio::test]
    async fn test_link_success() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/discord/link/deadbeef"))
            .and(header("Authorization", "Bearer session-token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        assert!(client(&server).link("deadbeef").await);
    }

    #[tokio::test]
    async fn test_link_unknown_code() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(!client.link("nope").await);
        assert!(matches!(
            client.try_link("nope").await,
            Err(LinkError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_unlink_success_and_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/discord/link/deadbeef"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/discord/link/other"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(client.unlink("deadbeef").await);
        assert!(matches!(
            client.try_unlink("other").await,
            Err(LinkError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_links_lists_codes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/discord/links"))
            .and(header("Authorization", "Bearer session-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"code": "deadbeef", "userId": 10, "guildId": 20, "uuid": "u", "expireAt": null}
            ])))
            .mount(&server)
            .await;

        let links = client(&server).links().await;
        assert_eq!(
            links,
            vec![Link {
                code: "deadbeef".to_string(),
                user_id: 10,
                guild_id: 20,
                uuid: Some("u".to_string()),
                expire_at: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_links_failure_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/discord/links"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(client.links().await.is_empty());
        assert!(matches!(
            client.try_links().await,
            Err(LinkError::MalformedResponse(_))
        ));
    }
}
