//! Redacting wrapper for credentials.
//!
//! Client secrets and bearer tokens pass through configuration, logs and
//! `Debug` output of larger structs. [`Secret`] keeps them out of all three.

use serde::{Deserialize, Serialize};

/// The client secret of a [`ClientConfig`](crate::ClientConfig) or the
/// bearer value of an [`AccessToken`](crate::AccessToken).
///
/// Formats as `[REDACTED]`. Deserializes from a plain string so a TOML
/// `client_secret = "..."` maps onto it directly.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value, for the token request body and the `Authorization`
    /// header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Secret {}
