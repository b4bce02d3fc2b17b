//! Client-credentials grant on top of the `oauth2` crate.
//!
//! This module is only available when the `oauth` feature is enabled.

use async_trait::async_trait;
use chrono::Utc;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{AuthType, AuthUrl, ClientId, ClientSecret, RequestTokenError, Scope, TokenResponse, TokenUrl};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ConfigError, CredentialsError};
use crate::resolve::ResolvedRoots;
use crate::secret::Secret;
use crate::token::{AccessToken, CredentialsProvider};

/// Create an OAuth2 client for the token endpoint of `roots`.
///
/// Client credentials are sent in the request body
/// (`client_secret_post`), which every Keycloak version accepts.
pub fn create_oauth_client(
    roots: &ResolvedRoots,
    client_id: impl Into<String>,
    client_secret: &Secret,
) -> BasicClient {
    BasicClient::new(
        ClientId::new(client_id.into()),
        Some(ClientSecret::new(client_secret.expose().to_string())),
        AuthUrl::from_url(roots.authorization_endpoint().clone()),
        Some(TokenUrl::from_url(roots.token_endpoint().clone())),
    )
    .set_auth_type(AuthType::RequestBody)
}

/// [`CredentialsProvider`] running the client-credentials grant against
/// the Keycloak token endpoint.
///
/// Each call to [`access_token`](CredentialsProvider::access_token) performs
/// a fresh token request.
#[derive(Debug, Clone)]
pub struct ClientCredentialsProvider {
    client: BasicClient,
    scopes: Vec<String>,
}

impl ClientCredentialsProvider {
    /// Create a provider for the token endpoint in `roots`.
    pub fn new(roots: &ResolvedRoots, client_id: impl Into<String>, client_secret: &Secret) -> Self {
        Self {
            client: create_oauth_client(roots, client_id, client_secret),
            scopes: Vec::new(),
        }
    }

    /// Create a provider straight from a configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let roots = ResolvedRoots::resolve(config)?;
        Ok(Self::new(&roots, config.client_id.clone(), &config.client_secret))
    }

    /// Request these scopes with every token.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Token endpoint this provider requests tokens from.
    pub fn token_endpoint(&self) -> Option<&url::Url> {
        self.client.token_url().map(|url| url.url())
    }
}

#[async_trait]
impl CredentialsProvider for ClientCredentialsProvider {
    async fn access_token(&self) -> Result<AccessToken, CredentialsError> {
        debug!(
            "requesting access token from {}",
            self.token_endpoint().map(|u| u.as_str()).unwrap_or("<unset>")
        );

        let mut request = self.client.exchange_client_credentials();
        for scope in &self.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }

        let response = request.request_async(async_http_client).await.map_err(|e| {
            let reason = match &e {
                RequestTokenError::ServerResponse(err) => {
                    format!("token endpoint rejected the request: {}", err)
                }
                RequestTokenError::Request(err) => format!("token request failed: {}", err),
                RequestTokenError::Parse(err, _) => {
                    format!("malformed token response: {}", err)
                }
                RequestTokenError::Other(message) => message.clone(),
            };
            warn!("client-credentials grant failed: {}", reason);
            CredentialsError::new(reason)
        })?;

        let scopes = response
            .scopes()
            .map(|s| s.iter().map(|scope| scope.to_string()).collect())
            .unwrap_or_default();

        let mut token = AccessToken::bearer(response.access_token().secret()).with_scopes(scopes);

        if let Some(duration) = response.expires_in() {
            let lifetime = chrono::Duration::from_std(duration).map_err(|e| {
                CredentialsError::new(format!("invalid expiration duration: {}", e))
            })?;
            token = token.with_expiry(Utc::now() + lifetime);
        }

        debug!("obtained access token (expires at {:?})", token.expires_at);
        Ok(token)
    }
}
