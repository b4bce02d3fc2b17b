use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{AdminError, ConfigError, TransportError};
use crate::resolve::ResolvedRoots;
use crate::token::CredentialsProvider;
use crate::transport::{AdminResponse, HttpTransport, ReqwestTransport, RequestOptions};

/// Client for the Keycloak admin REST API.
///
/// Every request obtains a fresh access token with the client-credentials
/// grant, then sends the request with that token as a bearer credential.
/// Nothing is cached between calls, so a client can be shared freely across
/// tasks.
///
/// # Example
///
/// ```no_run
/// use keycloak_admin_client::{ClientConfig, KeycloakClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::new("admin-cli", "secret", "master", "https://sso.example.com")
///         .with_base_path("");
///     let client = KeycloakClient::new(config)?;
///
///     let response = client.get("users?max=10").await?;
///     println!("{}: {}", response.status, response.text());
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct KeycloakClient {
    realm: String,
    roots: ResolvedRoots,
    credentials: Arc<dyn CredentialsProvider>,
    transport: Arc<dyn HttpTransport>,
}

impl KeycloakClient {
    /// Create a client with the default credentials provider and transport.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::builder(config).build()
    }

    /// Start building a client with custom capabilities.
    pub fn builder(config: ClientConfig) -> KeycloakClientBuilder {
        KeycloakClientBuilder::new(config)
    }

    /// Realm that [`issue_in_realm`](Self::issue_in_realm) scopes requests to.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Endpoint roots resolved at construction.
    pub fn roots(&self) -> &ResolvedRoots {
        &self.roots
    }

    /// The provider tokens are obtained from.
    pub fn credentials(&self) -> &Arc<dyn CredentialsProvider> {
        &self.credentials
    }

    /// Send an authenticated request to a URI relative to the admin root.
    ///
    /// A `body` is serialized as JSON and sent with
    /// `Content-Type: application/json`. The response is returned whatever
    /// its status.
    ///
    /// # Errors
    ///
    /// - [`AdminError::Credentials`] if no access token could be obtained;
    ///   nothing is sent in that case.
    /// - [`AdminError::Transport`] if the request could not be built or
    ///   dispatched.
    #[tracing::instrument(skip_all, fields(method = %method, uri = %relative_uri))]
    pub async fn issue<B>(
        &self,
        method: Method,
        relative_uri: &str,
        body: Option<&B>,
        headers: Option<HeaderMap>,
    ) -> Result<AdminResponse, AdminError>
    where
        B: Serialize + ?Sized,
    {
        let token = self.credentials.access_token().await.map_err(|e| {
            warn!("credentials rejected: {}", e.reason);
            e
        })?;

        let mut options = RequestOptions::new().with_headers(headers.unwrap_or_default());
        if let Some(body) = body {
            let encoded = serde_json::to_vec(body).map_err(TransportError::from_source)?;
            options = options.with_json_body(encoded);
        }

        let url = self
            .roots
            .admin_url(relative_uri)
            .map_err(TransportError::from_source)?;
        let request = self
            .credentials
            .authenticated_request(method, url, &token, options)?;

        debug!("dispatching {} {}", request.method, request.url);

        let response = self.transport.send(request).await.map_err(|e| {
            warn!("admin request failed: {}", e);
            e
        })?;

        debug!("received {}", response.status);
        Ok(response)
    }

    /// Like [`issue`](Self::issue), with `uri` relative to this client's realm.
    pub async fn issue_in_realm<B>(
        &self,
        method: Method,
        uri: &str,
        body: Option<&B>,
        headers: Option<HeaderMap>,
    ) -> Result<AdminResponse, AdminError>
    where
        B: Serialize + ?Sized,
    {
        let relative_uri = format!("{}/{}", self.realm, uri);
        self.issue(method, &relative_uri, body, headers).await
    }

    /// `GET` a resource in this client's realm.
    pub async fn get(&self, uri: &str) -> Result<AdminResponse, AdminError> {
        self.issue_in_realm::<()>(Method::GET, uri, None, None).await
    }

    /// `POST` a JSON body to this client's realm.
    pub async fn post<B>(&self, uri: &str, body: &B) -> Result<AdminResponse, AdminError>
    where
        B: Serialize + ?Sized,
    {
        self.issue_in_realm(Method::POST, uri, Some(body), None).await
    }

    /// `PUT` a JSON body to this client's realm.
    pub async fn put<B>(&self, uri: &str, body: &B) -> Result<AdminResponse, AdminError>
    where
        B: Serialize + ?Sized,
    {
        self.issue_in_realm(Method::PUT, uri, Some(body), None).await
    }

    /// `DELETE` a resource in this client's realm.
    pub async fn delete(&self, uri: &str) -> Result<AdminResponse, AdminError> {
        self.issue_in_realm::<()>(Method::DELETE, uri, None, None).await
    }
}

impl fmt::Debug for KeycloakClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeycloakClient")
            .field("realm", &self.realm)
            .field("token_endpoint", &self.roots.token_endpoint().as_str())
            .field("admin_root", &self.roots.admin_root().as_str())
            .finish_non_exhaustive()
    }
}

/// Builder for a [`KeycloakClient`] with substituted capabilities.
pub struct KeycloakClientBuilder {
    config: ClientConfig,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    transport: Option<Arc<dyn HttpTransport>>,
    http_client: Option<reqwest::Client>,
}

impl KeycloakClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            credentials: None,
            transport: None,
            http_client: None,
        }
    }

    /// Use this provider instead of the client-credentials grant.
    pub fn credentials(mut self, provider: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(provider);
        self
    }

    /// Use this transport instead of [`ReqwestTransport`].
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Configure the `reqwest` client used by the default transport.
    ///
    /// Ignored when a transport is set explicitly.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Resolve the endpoint roots and build the client.
    pub fn build(self) -> Result<KeycloakClient, ConfigError> {
        let roots = ResolvedRoots::resolve(&self.config)?;

        debug!(
            "resolved token endpoint {} and admin root {}",
            roots.token_endpoint(),
            roots.admin_root()
        );

        let credentials = match self.credentials {
            Some(provider) => provider,
            None => default_credentials(&self.config, &roots)?,
        };

        let transport = self.transport.unwrap_or_else(|| {
            Arc::new(ReqwestTransport::with_client(
                self.http_client.unwrap_or_default(),
            ))
        });

        Ok(KeycloakClient {
            realm: self.config.realm,
            roots,
            credentials,
            transport,
        })
    }
}

#[cfg(feature = "oauth")]
fn default_credentials(
    config: &ClientConfig,
    roots: &ResolvedRoots,
) -> Result<Arc<dyn CredentialsProvider>, ConfigError> {
    Ok(Arc::new(crate::oauth::ClientCredentialsProvider::new(
        roots,
        config.client_id.clone(),
        &config.client_secret,
    )))
}

#[cfg(not(feature = "oauth"))]
fn default_credentials(
    _config: &ClientConfig,
    _roots: &ResolvedRoots,
) -> Result<Arc<dyn CredentialsProvider>, ConfigError> {
    Err(ConfigError::OAuth {
        message: "no credentials provider set and the `oauth` feature is disabled".to_string(),
    })
}
