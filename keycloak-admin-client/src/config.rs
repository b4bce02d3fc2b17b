//! Client configuration.
//!
//! A [`ClientConfig`] can be built in code, parsed from TOML, or read from
//! environment variables:
//!
//! ```toml
//! client_id = "admin-cli"
//! client_secret = "..."
//! realm = "master"
//! server_url = "https://sso.example.com"
//! # auth_realm = "master"
//! # base_path = ""
//! ```
//!
//! ## Environment Variable Format
//!
//! Variables follow the pattern `{PREFIX}_{FIELD}` with the default prefix
//! `KEYCLOAK`:
//! - `KEYCLOAK_CLIENT_ID`, `KEYCLOAK_CLIENT_SECRET`, `KEYCLOAK_REALM`, `KEYCLOAK_URL`
//! - `KEYCLOAK_AUTH_REALM` (optional)
//! - `KEYCLOAK_BASE_PATH` (optional; set to an empty value for "no prefix")

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::ConfigError;
use crate::secret::Secret;

/// Relative path Keycloak is served under when none is configured.
///
/// Keycloak 17+ dropped this prefix; older servers and servers started with
/// `--http-relative-path=/auth` still use it.
pub const DEFAULT_BASE_PATH: &str = "/auth";

/// Default prefix for environment variables.
pub const DEFAULT_ENV_PREFIX: &str = "KEYCLOAK";

/// Relative HTTP path the server is mounted under.
///
/// An unset base path and an empty one mean different things: unset falls
/// back to [`DEFAULT_BASE_PATH`], while `""` or `"/"` means the server sits at
/// the root of `server_url`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BasePath {
    /// Not configured; resolves to [`DEFAULT_BASE_PATH`].
    #[default]
    Default,

    /// Explicitly configured, used verbatim (may be empty).
    Custom(String),
}

impl BasePath {
    /// The path the endpoint resolver should use.
    pub fn effective(&self) -> &str {
        match self {
            Self::Default => DEFAULT_BASE_PATH,
            Self::Custom(path) => path,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl From<Option<String>> for BasePath {
    fn from(value: Option<String>) -> Self {
        value.map(Self::Custom).unwrap_or_default()
    }
}

impl From<&str> for BasePath {
    fn from(value: &str) -> Self {
        Self::Custom(value.to_string())
    }
}

impl From<String> for BasePath {
    fn from(value: String) -> Self {
        Self::Custom(value)
    }
}

impl<'de> Deserialize<'de> for BasePath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // null behaves like an absent key; only a string opts out of the default
        Option::<String>::deserialize(deserializer).map(BasePath::from)
    }
}

/// Connection settings for a Keycloak admin client.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// OAuth client ID used for the client-credentials grant.
    pub client_id: String,

    /// OAuth client secret.
    pub client_secret: Secret,

    /// Realm whose admin API requests are scoped to.
    pub realm: String,

    /// Server URL, without the relative base path.
    #[serde(alias = "url")]
    pub server_url: String,

    /// Realm to authenticate against, when it differs from `realm`.
    #[serde(default, alias = "alt_auth_realm")]
    pub auth_realm: Option<String>,

    /// Relative base path the server is mounted under.
    #[serde(default)]
    pub base_path: BasePath,
}

impl ClientConfig {
    /// Create a configuration with the default base path and no alternate
    /// auth realm.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        realm: impl Into<String>,
        server_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret),
            realm: realm.into(),
            server_url: server_url.into(),
            auth_realm: None,
            base_path: BasePath::Default,
        }
    }

    /// Authenticate against another realm than the one being administered.
    pub fn with_auth_realm(mut self, realm: impl Into<String>) -> Self {
        self.auth_realm = Some(realm.into());
        self
    }

    /// Set the relative base path. Pass `None` to restore the default.
    pub fn with_base_path(mut self, base_path: impl Into<BasePath>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Realm used for token acquisition.
    ///
    /// An empty alternate realm counts as unset.
    pub fn effective_auth_realm(&self) -> &str {
        match self.auth_realm.as_deref() {
            Some(realm) if !realm.is_empty() => realm,
            _ => &self.realm,
        }
    }

    /// Check that the fields needed to build endpoint URLs are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_url.trim_matches('/').is_empty() {
            return Err(ConfigError::MissingField {
                field: "server_url".to_string(),
            });
        }
        if self.realm.is_empty() {
            return Err(ConfigError::MissingField {
                field: "realm".to_string(),
            });
        }
        Ok(())
    }

    /// Parse a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("loading client config from {:?}", path);

        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_toml_str(&contents)
    }

    /// Read configuration from `KEYCLOAK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Read configuration from `{prefix}_*` environment variables.
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let config = Self {
            client_id: required_env(prefix, "CLIENT_ID")?,
            client_secret: Secret::new(required_env(prefix, "CLIENT_SECRET")?),
            realm: required_env(prefix, "REALM")?,
            server_url: required_env(prefix, "URL")?,
            auth_realm: optional_env(prefix, "AUTH_REALM"),
            base_path: BasePath::from(optional_env(prefix, "BASE_PATH")),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Default config file location (`<config dir>/client.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "keycloak-admin-client")
        .map(|dirs| dirs.config_dir().join("client.toml"))
}

fn env_name(prefix: &str, field: &str) -> String {
    format!("{}_{}", prefix, field)
}

fn required_env(prefix: &str, field: &str) -> Result<String, ConfigError> {
    let name = env_name(prefix, field);
    std::env::var(&name).map_err(|_| ConfigError::MissingField { field: name })
}

/// A set-but-empty variable is `Some("")`, which matters for `BASE_PATH`.
fn optional_env(prefix: &str, field: &str) -> Option<String> {
    let name = env_name(prefix, field);
    let value = std::env::var(&name).ok();
    if value.is_some() {
        debug!("found optional env var {}", name);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        client_id = "admin-cli"
        client_secret = "secret"
        realm = "master"
        server_url = "http://localhost"
    "#;

    #[test]
    fn test_base_path_tri_state_from_toml() {
        let omitted = ClientConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(omitted.base_path, BasePath::Default);
        assert_eq!(omitted.base_path.effective(), "/auth");

        let empty = ClientConfig::from_toml_str(&format!("{}\nbase_path = \"\"", MINIMAL)).unwrap();
        assert_eq!(empty.base_path, BasePath::Custom(String::new()));
        assert_eq!(empty.base_path.effective(), "");

        let custom =
            ClientConfig::from_toml_str(&format!("{}\nbase_path = \"/kc\"", MINIMAL)).unwrap();
        assert_eq!(custom.base_path.effective(), "/kc");
    }

    #[test]
    fn test_base_path_null_is_default() {
        let config: ClientConfig = serde_json::from_value(serde_json::json!({
            "client_id": "id",
            "client_secret": "secret",
            "realm": "master",
            "url": "http://localhost",
            "base_path": null,
        }))
        .unwrap();

        assert!(config.base_path.is_default());
    }

    #[test]
    fn test_with_base_path_none_restores_default() {
        let config = ClientConfig::new("id", "secret", "master", "http://localhost")
            .with_base_path("")
            .with_base_path(None::<String>);

        assert_eq!(config.base_path, BasePath::Default);
    }

    #[test]
    fn test_effective_auth_realm() {
        let config = ClientConfig::new("id", "secret", "master", "http://localhost");
        assert_eq!(config.effective_auth_realm(), "master");

        let config = config.with_auth_realm("");
        assert_eq!(config.effective_auth_realm(), "master");

        let config = config.with_auth_realm("other");
        assert_eq!(config.effective_auth_realm(), "other");
    }

    #[test]
    fn test_missing_realm_rejected() {
        let err = ClientConfig::new("id", "secret", "", "http://localhost")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field } if field == "realm"));
    }

    #[test]
    fn test_client_secret_not_in_debug_output() {
        let config = ClientConfig::from_toml_str(MINIMAL).unwrap();
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_from_env_with_prefix() {
        // SAFETY: Test-only env var manipulation, prefix unique to this test
        unsafe {
            std::env::set_var("KCENVTEST_CLIENT_ID", "env-client");
            std::env::set_var("KCENVTEST_CLIENT_SECRET", "env-secret");
            std::env::set_var("KCENVTEST_REALM", "tenant");
            std::env::set_var("KCENVTEST_URL", "https://sso.example.com");
            std::env::set_var("KCENVTEST_BASE_PATH", "");
        }

        let config = ClientConfig::from_env_with_prefix("KCENVTEST").unwrap();

        assert_eq!(config.client_id, "env-client");
        assert_eq!(config.client_secret.expose(), "env-secret");
        assert_eq!(config.realm, "tenant");
        assert_eq!(config.server_url, "https://sso.example.com");
        assert_eq!(config.auth_realm, None);
        assert_eq!(config.base_path, BasePath::Custom(String::new()));

        // SAFETY: Test-only env var manipulation
        unsafe {
            for field in ["CLIENT_ID", "CLIENT_SECRET", "REALM", "URL", "BASE_PATH"] {
                std::env::remove_var(format!("KCENVTEST_{}", field));
            }
        }
    }

    #[test]
    fn test_from_env_missing_variable() {
        let err = ClientConfig::from_env_with_prefix("KCENVMISSING").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field } if field == "KCENVMISSING_CLIENT_ID"));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, format!("{}\nauth_realm = \"master\"", MINIMAL)).unwrap();

        let config = ClientConfig::load(&path).await.unwrap();
        assert_eq!(config.auth_realm.as_deref(), Some("master"));
    }

    #[test]
    fn test_default_config_path_file_name() {
        if let Some(path) = default_config_path() {
            assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("client.toml"));
        }
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load(dir.path().join("absent.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
