//! Access tokens and the credentials capability.
//!
//! This module provides:
//! - [`AccessToken`] - a bearer token with metadata
//! - [`CredentialsProvider`] - trait for obtaining tokens and authenticating requests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use url::Url;

use crate::error::CredentialsError;
use crate::secret::Secret;
use crate::transport::{AdminRequest, RequestOptions};

/// An access token issued by the token endpoint.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The token value.
    pub secret: Secret,

    /// Token type (usually "Bearer").
    pub token_type: String,

    /// When this token expires (None if the server did not say).
    pub expires_at: Option<DateTime<Utc>>,

    /// Scopes granted with this token.
    pub scopes: Vec<String>,
}

impl AccessToken {
    /// Create a bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            secret: Secret::new(token),
            token_type: "Bearer".to_string(),
            expires_at: None,
            scopes: Vec::new(),
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Check if this token has expired.
    ///
    /// Returns `false` if no expiration is set.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| exp < Utc::now()).unwrap_or(false)
    }

    /// Value of the `Authorization` header.
    ///
    /// Always uses the `Bearer` scheme: Keycloak reports the type as
    /// "Bearer" or "bearer" depending on version.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.secret.expose())
    }
}

/// Obtains access tokens and turns plain requests into authenticated ones.
///
/// Implemented by [`ClientCredentialsProvider`](crate::oauth::ClientCredentialsProvider);
/// tests substitute their own.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Obtain an access token with the client-credentials grant.
    ///
    /// Every call may hit the token endpoint; no caching is implied.
    async fn access_token(&self) -> Result<AccessToken, CredentialsError>;

    /// Build a request carrying `token` in its `Authorization` header.
    ///
    /// The token replaces any `Authorization` header in `options`; other
    /// headers and the body are kept.
    fn authenticated_request(
        &self,
        method: Method,
        url: Url,
        token: &AccessToken,
        options: RequestOptions,
    ) -> Result<AdminRequest, CredentialsError> {
        let mut authorization = HeaderValue::from_str(&token.authorization_header())
            .map_err(|_| CredentialsError::new("access token is not a valid header value"))?;
        authorization.set_sensitive(true);

        let mut request = AdminRequest::new(method, url);
        request.headers = options.headers;
        request.headers.insert(AUTHORIZATION, authorization);
        request.body = options.body;

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;

    struct StaticCredentials;

    #[async_trait]
    impl CredentialsProvider for StaticCredentials {
        async fn access_token(&self) -> Result<AccessToken, CredentialsError> {
            Ok(AccessToken::bearer("static"))
        }
    }

    #[test]
    fn test_token_is_expired() {
        let expired = AccessToken::bearer("t").with_expiry(Utc::now() - chrono::Duration::minutes(1));
        assert!(expired.is_expired());

        let valid = AccessToken::bearer("t").with_expiry(Utc::now() + chrono::Duration::minutes(5));
        assert!(!valid.is_expired());

        assert!(!AccessToken::bearer("t").is_expired());
    }

    #[test]
    fn test_token_value_redacted() {
        let token = AccessToken::bearer("eyJhbGciOi");
        assert!(!format!("{:?}", token).contains("eyJhbGciOi"));
        assert_eq!(token.authorization_header(), "Bearer eyJhbGciOi");
    }

    #[test]
    fn test_authenticated_request_overrides_authorization() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let url = Url::parse("http://localhost/admin/realms/master/users").unwrap();
        let request = StaticCredentials
            .authenticated_request(
                Method::GET,
                url.clone(),
                &AccessToken::bearer("abc"),
                RequestOptions::new().with_headers(headers),
            )
            .unwrap();

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, url);
        assert_eq!(request.headers[AUTHORIZATION], "Bearer abc");
        assert_eq!(request.headers["accept"], "application/json");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_authenticated_request_rejects_invalid_token() {
        let url = Url::parse("http://localhost/admin/realms/").unwrap();
        let result = StaticCredentials.authenticated_request(
            Method::GET,
            url,
            &AccessToken::bearer("line\nbreak"),
            RequestOptions::new(),
        );

        assert!(result.is_err());
    }
}
