//! Application configuration.
//!
//! Provider credentials come from `~/.config/trackshift/config.toml` with
//! environment-variable overrides (`TRACKSHIFT_CLIENT_ID`,
//! `TRACKSHIFT_CLIENT_SECRET`, `TRACKSHIFT_REDIRECT_URI`). Missing required
//! values fail at startup, never mid-run.
//!
//! Endpoint URLs default to the Spotify production endpoints and are
//! overridable, which is how the integration tests point the library at a
//! local mock server.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::storage::config_dir;

const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_base: String,
}

/// On-disk configuration shape; every field optional so that a partial
/// file plus environment overrides can still resolve.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    auth_url: Option<String>,
    token_url: Option<String>,
    api_base: Option<String>,
}

impl Config {
    /// Construct a configuration with default provider endpoints.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Override the provider authorization endpoint.
    #[must_use]
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    /// Override the provider token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Override the provider API base URL.
    #[must_use]
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    /// Load from `config.toml` in the config directory, applying
    /// environment overrides.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if a
    /// required key is missing from both the file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let dir = config_dir().map_err(|e| ConfigError::LoadFailed {
            path: "~/.config/trackshift".into(),
            message: e.to_string(),
        })?;
        Self::load_from(&dir.join("config.toml"))
    }

    /// Load from a specific config file path, applying environment
    /// overrides. The file is allowed to be absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let file = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            FileConfig::default()
        };

        resolve(file, EnvOverrides::from_process_env())
    }
}

/// Environment-variable overrides, read once at load time.
#[derive(Debug, Default)]
struct EnvOverrides {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
}

impl EnvOverrides {
    fn from_process_env() -> Self {
        Self {
            client_id: std::env::var("TRACKSHIFT_CLIENT_ID").ok(),
            client_secret: std::env::var("TRACKSHIFT_CLIENT_SECRET").ok(),
            redirect_uri: std::env::var("TRACKSHIFT_REDIRECT_URI").ok(),
        }
    }
}

/// Merge file values and environment overrides into a resolved config.
/// Environment wins; required keys missing from both are fatal.
fn resolve(file: FileConfig, env: EnvOverrides) -> Result<Config, ConfigError> {
    let client_id = env
        .client_id
        .or(file.client_id)
        .ok_or(ConfigError::MissingKey("client_id"))?;
    let client_secret = env
        .client_secret
        .or(file.client_secret)
        .ok_or(ConfigError::MissingKey("client_secret"))?;
    let redirect_uri = env
        .redirect_uri
        .or(file.redirect_uri)
        .ok_or(ConfigError::MissingKey("redirect_uri"))?;

    if client_id.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "client_id",
            message: "must not be empty".into(),
        });
    }

    Ok(Config {
        client_id,
        client_secret,
        redirect_uri,
        auth_url: file.auth_url.unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
        token_url: file
            .token_url
            .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
        api_base: file.api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_requires_client_id() {
        let err = resolve(FileConfig::default(), EnvOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey("client_id")));
    }

    #[test]
    fn resolve_env_wins_over_file() {
        let file: FileConfig = toml::from_str(
            r#"
            client_id = "file-id"
            client_secret = "file-secret"
            redirect_uri = "http://127.0.0.1:8888/callback"
            "#,
        )
        .unwrap();
        let env = EnvOverrides {
            client_id: Some("env-id".into()),
            ..Default::default()
        };

        let config = resolve(file, env).unwrap();
        assert_eq!(config.client_id, "env-id");
        assert_eq!(config.client_secret, "file-secret");
        assert_eq!(config.auth_url, DEFAULT_AUTH_URL);
    }

    #[test]
    fn resolve_keeps_endpoint_overrides_from_file() {
        let file: FileConfig = toml::from_str(
            r#"
            client_id = "id"
            client_secret = "secret"
            redirect_uri = "http://127.0.0.1:8888/callback"
            api_base = "http://127.0.0.1:9999/v1"
            "#,
        )
        .unwrap();

        let config = resolve(file, EnvOverrides::default()).unwrap();
        assert_eq!(config.api_base, "http://127.0.0.1:9999/v1");
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
    }

    #[test]
    fn builder_overrides() {
        let config = Config::new("id", "secret", "http://localhost/callback")
            .with_token_url("http://127.0.0.1:1234/api/token")
            .with_api_base("http://127.0.0.1:1234/v1");
        assert_eq!(config.token_url, "http://127.0.0.1:1234/api/token");
        assert_eq!(config.api_base, "http://127.0.0.1:1234/v1");
        assert_eq!(config.auth_url, DEFAULT_AUTH_URL);
    }
}
