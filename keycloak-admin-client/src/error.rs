//! Error types for the admin client.
//!
//! Requests fail in exactly two ways, both wrapped by [`AdminError`]:
//! - [`CredentialsError`] - the access token could not be obtained
//! - [`TransportError`] - the authenticated request could not be dispatched
//!
//! [`ConfigError`] is only produced while building a client.

use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Boxed underlying error kept for diagnostic chaining.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Token acquisition failed.
///
/// Raised for any cause: rejected client credentials, an unreachable token
/// endpoint or a malformed token response. The display message is generic;
/// `reason` carries the underlying description for logs.
#[derive(Debug, Error)]
#[error("unable to obtain access token with client credentials")]
pub struct CredentialsError {
    /// Description of the underlying failure.
    pub reason: String,
}

impl CredentialsError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The authenticated request failed at the HTTP layer.
///
/// A response with a non-2xx status is not a transport failure.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    /// Message of the underlying failure.
    pub message: String,

    /// HTTP status code reported by the underlying error, if any.
    pub code: Option<u16>,

    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    /// Create a transport error without an underlying cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// Wrap an underlying error, keeping its message as our own.
    pub fn from_source<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: source.to_string(),
            code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach the status code reported by the underlying error.
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let code = err.status().map(|status| status.as_u16());
        let mut wrapped = Self::from_source(err);
        wrapped.code = code;
        wrapped
    }
}

/// Error returned by [`KeycloakClient::issue`](crate::KeycloakClient::issue)
/// and [`KeycloakClient::issue_in_realm`](crate::KeycloakClient::issue_in_realm).
#[derive(Debug, Error)]
pub enum AdminError {
    /// Token acquisition failed; no admin request was sent.
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    /// The admin request could not be dispatched.
    #[error("admin request failed: {0}")]
    Transport(#[from] TransportError),
}

impl AdminError {
    pub fn is_credentials(&self) -> bool {
        matches!(self, Self::Credentials(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Invalid or incomplete client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required field is empty or absent.
    #[error("missing configuration value: {field}")]
    MissingField { field: String },

    /// The server URL and base path do not combine into an absolute URL.
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A configuration file could not be read.
    #[error("failed to read config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration document could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The OAuth2 client could not be set up.
    #[error("OAuth client setup failed: {message}")]
    OAuth { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_preserves_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = TransportError::from_source(io).with_code(502);

        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.code, Some(502));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_admin_error_kinds() {
        let err: AdminError = CredentialsError::new("invalid_client").into();
        assert!(err.is_credentials());
        assert!(!err.is_transport());

        let err: AdminError = TransportError::new("reset").into();
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "admin request failed: reset");
    }
}
