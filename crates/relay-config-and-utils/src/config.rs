//! Configuration management for the relay client.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default relay REST/WebSocket endpoint.
pub const DEFAULT_SERVER_URL: &str = "https://gc.sussy.dev/";

/// Default session server used to prove account ownership.
pub const DEFAULT_SESSION_SERVER_URL: &str = "https://sessionserver.mojang.com";

/// Default prefix that routes a chat line to the local channel.
pub const DEFAULT_LOCAL_PREFIX: &str = "~";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default first reconnect delay in milliseconds.
pub const DEFAULT_RECONNECT_BASE_DELAY_MS: u64 = 500;

/// Default reconnect delay ceiling in milliseconds.
pub const DEFAULT_RECONNECT_MAX_DELAY_MS: u64 = 30_000;

const ENV_LOG_LEVEL: &str = "GOOBERCORD_LOG_LEVEL";
const ENV_SERVER_URL: &str = "GOOBERCORD_SERVER_URL";

/// Relay client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Relay server's REST API endpoint.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Chat prefix for local messages.
    #[serde(default = "default_local_prefix")]
    pub local_prefix: String,
    /// Session server base URL.
    #[serde(default = "default_session_server_url")]
    pub session_server_url: String,
    /// First reconnect delay; 0 reconnects immediately.
    #[serde(default = "default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,
    /// Upper bound for the reconnect delay.
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_local_prefix() -> String {
    DEFAULT_LOCAL_PREFIX.to_string()
}

fn default_session_server_url() -> String {
    DEFAULT_SESSION_SERVER_URL.to_string()
}

fn default_reconnect_base_delay_ms() -> u64 {
    DEFAULT_RECONNECT_BASE_DELAY_MS
}

fn default_reconnect_max_delay_ms() -> u64 {
    DEFAULT_RECONNECT_MAX_DELAY_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            server_url: default_server_url(),
            local_prefix: default_local_prefix(),
            session_server_url: default_session_server_url(),
            reconnect_base_delay_ms: DEFAULT_RECONNECT_BASE_DELAY_MS,
            reconnect_max_delay_ms: DEFAULT_RECONNECT_MAX_DELAY_MS,
        }
    }
}

impl Config {
    /// Load configuration from the config file, falling back to defaults,
    /// then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn load_from_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `GOOBERCORD_*` overrides from the given lookup. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(log_level) = non_empty(ENV_LOG_LEVEL) {
            self.log_level = log_level;
        }
        if let Some(server_url) = non_empty(ENV_SERVER_URL) {
            self.server_url = server_url;
        }
    }

    /// Check values that would otherwise only fail much later.
    pub fn validate(&self) -> CoreResult<()> {
        self.server_url()?;
        if self.local_prefix.is_empty() {
            return Err(CoreError::Config("local_prefix must not be empty".to_string()));
        }
        if self.reconnect_max_delay_ms < self.reconnect_base_delay_ms {
            return Err(CoreError::Config(format!(
                "reconnect_max_delay_ms ({}) is below reconnect_base_delay_ms ({})",
                self.reconnect_max_delay_ms, self.reconnect_base_delay_ms
            )));
        }
        Ok(())
    }

    /// Get the relay server URL as a parsed URL.
    pub fn server_url(&self) -> CoreResult<Url> {
        Url::parse(&self.server_url).map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.local_prefix, "~");
        assert_eq!(config.session_server_url, DEFAULT_SESSION_SERVER_URL);
        assert_eq!(config.reconnect_base_delay_ms, 500);
        assert_eq!(config.reconnect_max_delay_ms, 30_000);
    }

    #[test]
    fn test_config_load_from_file_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");

        std::fs::write(
            &config_path,
            r##"{ "log_level": "debug", "local_prefix": "#" }"##,
        )
        .unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.local_prefix, "#");
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.reconnect_base_delay_ms, DEFAULT_RECONNECT_BASE_DELAY_MS);
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = Config {
            server_url: "http://localhost:8080/".to_string(),
            reconnect_base_delay_ms: 0,
            ..Config::default()
        };
        paths.ensure_dirs().unwrap();
        std::fs::write(
            paths.config_file(),
            serde_json::to_string_pretty(&config).unwrap(),
        )
        .unwrap();

        let loaded = Config::load_from_file(&paths.config_file()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = Config::load(&paths).unwrap();
        assert_eq!(config.local_prefix, DEFAULT_LOCAL_PREFIX);
    }

    #[test]
    fn test_config_load_rejects_malformed_file() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());
        std::fs::write(paths.config_file(), "{ not json").unwrap();

        assert!(matches!(Config::load(&paths), Err(CoreError::Json(_))));
    }

    #[test]
    fn test_apply_overrides() {
        let env: HashMap<&str, &str> = [
            ("GOOBERCORD_LOG_LEVEL", "trace"),
            ("GOOBERCORD_SERVER_URL", "http://127.0.0.1:5000/"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.log_level, "trace");
        assert_eq!(config.server_url, "http://127.0.0.1:5000/");
    }

    #[test]
    fn test_apply_overrides_ignores_blank_values() {
        let mut config = Config::default();
        config.apply_overrides(|_| Some("   ".to_string()));

        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_config_server_url_parse() {
        let config = Config::default();
        let url = config.server_url().unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("gc.sussy.dev"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            server_url: "not a valid url".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::InvalidUrl(_))));

        let config = Config {
            local_prefix: String::new(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = Config {
            reconnect_base_delay_ms: 10_000,
            reconnect_max_delay_ms: 1_000,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }
}
