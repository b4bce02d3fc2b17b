//! # Keycloak Admin Client
//!
//! Authenticated access to the Keycloak admin REST API for service accounts.
//!
//! This crate provides:
//! - Endpoint resolution from a server URL, relative base path and realm
//! - Client-credentials token acquisition (with the `oauth` feature)
//! - A request issuer that attaches a fresh bearer token to every request
//! - Traits for the credentials and transport capabilities, so either can be
//!   replaced in tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keycloak_admin_client::{ClientConfig, KeycloakClient, Method};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Keycloak 17+ serves from the root; older versions under /auth (the default)
//! let config = ClientConfig::new("admin-cli", "secret", "master", "https://sso.example.com")
//!     .with_base_path("");
//! let client = KeycloakClient::new(config)?;
//!
//! // GET https://sso.example.com/admin/realms/master/users
//! let users = client.issue_in_realm::<()>(Method::GET, "users", None, None).await?;
//!
//! // Realm-less requests are relative to the admin root
//! let realms = client.issue::<()>(Method::GET, "", None, None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Base Path
//!
//! | `base_path`                          | admin root                      |
//! |--------------------------------------|---------------------------------|
//! | unset                                | `{server_url}/auth/admin/realms/` |
//! | `""` or `"/"`                        | `{server_url}/admin/realms/`      |
//! | `"kc"`, `"/kc"`, `"kc/"`, `"/kc/"`   | `{server_url}/kc/admin/realms/`   |
//!
//! # Feature Flags
//!
//! - `oauth` (default): client-credentials provider built on the `oauth2` crate

mod client;
pub mod config;
pub mod error;
pub mod resolve;
pub mod secret;
pub mod token;
pub mod transport;

#[cfg(feature = "oauth")]
pub mod oauth;

// Re-export commonly used types at crate root
pub use client::{KeycloakClient, KeycloakClientBuilder};

pub use config::{BasePath, ClientConfig, DEFAULT_BASE_PATH, default_config_path};

pub use error::{AdminError, ConfigError, CredentialsError, TransportError};

pub use resolve::ResolvedRoots;

pub use secret::Secret;

pub use token::{AccessToken, CredentialsProvider};

pub use transport::{AdminRequest, AdminResponse, HttpTransport, ReqwestTransport, RequestOptions};

#[cfg(feature = "oauth")]
pub use oauth::ClientCredentialsProvider;

pub use reqwest::header::{HeaderMap, HeaderValue};
pub use reqwest::{Method, StatusCode};
