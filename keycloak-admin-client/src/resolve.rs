//! Endpoint resolution.
//!
//! Combines the server URL, the relative base path and the realms of a
//! [`ClientConfig`] into the two roots every request is built from:
//!
//! ```text
//! {server_url}/{base_path}/realms/{auth_realm}/protocol/openid-connect/token
//! {server_url}/{base_path}/admin/realms/
//! ```
//!
//! Leading and trailing slashes on either input are normalized away, so
//! `"kc"`, `"/kc"`, `"kc/"` and `"/kc/"` all yield a single `kc` segment,
//! and an empty or `"/"` base path yields none.

use url::Url;

use crate::config::ClientConfig;
use crate::error::ConfigError;

const OIDC_PROTOCOL_PATH: &str = "protocol/openid-connect";

/// Absolute endpoint roots derived from a [`ClientConfig`].
///
/// # Example
///
/// ```
/// use keycloak_admin_client::{ClientConfig, ResolvedRoots};
///
/// let config = ClientConfig::new("admin-cli", "secret", "master", "http://localhost");
/// let roots = ResolvedRoots::resolve(&config).unwrap();
///
/// assert_eq!(
///     roots.token_endpoint().as_str(),
///     "http://localhost/auth/realms/master/protocol/openid-connect/token"
/// );
/// assert_eq!(roots.admin_root().as_str(), "http://localhost/auth/admin/realms/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoots {
    token_endpoint: Url,
    authorization_endpoint: Url,
    admin_root: Url,
}

impl ResolvedRoots {
    /// Derive the endpoint roots. Performs no I/O.
    pub fn resolve(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let full_base = full_base_url(&config.server_url, config.base_path.effective());
        let realm_base = format!("{}/realms/{}", full_base, config.effective_auth_realm());

        Ok(Self {
            token_endpoint: parse_absolute(format!("{}/{}/token", realm_base, OIDC_PROTOCOL_PATH))?,
            authorization_endpoint: parse_absolute(format!(
                "{}/{}/auth",
                realm_base, OIDC_PROTOCOL_PATH
            ))?,
            admin_root: parse_absolute(format!("{}/admin/realms/", full_base))?,
        })
    }

    /// Token endpoint of the authentication realm. No trailing slash.
    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }

    /// Authorization endpoint of the authentication realm.
    ///
    /// Never requested by the client-credentials grant, but OAuth2 clients
    /// are configured with it.
    pub fn authorization_endpoint(&self) -> &Url {
        &self.authorization_endpoint
    }

    /// Root of the admin API, always ending in `/admin/realms/`.
    pub fn admin_root(&self) -> &Url {
        &self.admin_root
    }

    /// Resolve a URI relative to the admin root.
    ///
    /// Leading slashes are ignored; everything else follows RFC 3986
    /// reference resolution. `..` segments can therefore climb above the
    /// admin root, and a first segment with a scheme (`urn:x`) replaces it.
    /// Query strings and fragments are kept.
    ///
    /// ```
    /// # use keycloak_admin_client::{ClientConfig, ResolvedRoots};
    /// # let roots = ResolvedRoots::resolve(
    /// #     &ClientConfig::new("id", "secret", "master", "http://localhost").with_base_path(""),
    /// # ).unwrap();
    /// let url = roots.admin_url("master/users?max=10").unwrap();
    /// assert_eq!(url.as_str(), "http://localhost/admin/realms/master/users?max=10");
    /// ```
    pub fn admin_url(&self, relative: &str) -> Result<Url, url::ParseError> {
        self.admin_root.join(relative.trim_start_matches('/'))
    }
}

/// Join the server URL and the base path into a base without leading or
/// trailing slashes.
fn full_base_url(server_url: &str, base_path: &str) -> String {
    format!(
        "{}/{}",
        server_url.trim_end_matches('/'),
        base_path.trim_start_matches('/')
    )
    .trim_matches('/')
    .to_string()
}

fn parse_absolute(candidate: String) -> Result<Url, ConfigError> {
    match Url::parse(&candidate) {
        Ok(url) if !url.cannot_be_a_base() => Ok(url),
        Ok(_) => Err(ConfigError::InvalidUrl {
            url: candidate,
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        }),
        Err(source) => Err(ConfigError::InvalidUrl {
            url: candidate,
            source,
        }),
    }
}
