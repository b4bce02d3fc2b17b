//! HTTP transport abstraction.
//!
//! This module provides:
//! - [`AdminRequest`] / [`AdminResponse`] - transport-neutral request and response
//! - [`RequestOptions`] - caller headers and body for a request being built
//! - [`HttpTransport`] - trait for dispatching requests, substitutable in tests
//! - [`ReqwestTransport`] - default implementation on top of `reqwest`

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::TransportError;

/// An outbound admin API request.
#[derive(Debug, Clone)]
pub struct AdminRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl AdminRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// Headers and body supplied when building a request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from caller-supplied headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Attach a JSON body, forcing `Content-Type: application/json`.
    pub fn with_json_body(mut self, body: Vec<u8>) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(body);
        self
    }
}

/// A raw admin API response.
///
/// The status is not interpreted; 4xx and 5xx responses are returned like
/// any other.
#[derive(Debug, Clone)]
pub struct AdminResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl AdminResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body deserialized from JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Value of the `Location` header, as returned by create endpoints.
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }
}

/// Dispatches authenticated admin requests.
///
/// Implementations must not treat non-2xx statuses as errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: AdminRequest) -> Result<AdminResponse, TransportError>;
}

/// [`HttpTransport`] backed by a [`reqwest::Client`].
///
/// Timeouts, TLS and connection pooling are whatever the wrapped client is
/// configured with.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: AdminRequest) -> Result<AdminResponse, TransportError> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        debug!("admin API responded with {}", status);

        Ok(AdminResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body_overrides_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.insert("x-request-id", HeaderValue::from_static("abc"));

        let options = RequestOptions::new()
            .with_headers(headers)
            .with_json_body(b"{}".to_vec());

        assert_eq!(options.headers[CONTENT_TYPE], "application/json");
        assert_eq!(options.headers["x-request-id"], "abc");
        assert_eq!(options.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_caller_content_type_kept_without_body() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let options = RequestOptions::new().with_headers(headers);

        assert_eq!(options.headers[CONTENT_TYPE], "text/plain");
        assert!(options.body.is_none());
    }

    #[test]
    fn test_response_accessors() {
        let response = AdminResponse::new(StatusCode::NOT_FOUND)
            .with_body(r#"{"error":"User not found"}"#);

        assert!(!response.is_success());
        assert_eq!(response.text(), r#"{"error":"User not found"}"#);

        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["error"], "User not found");
    }

    #[test]
    fn test_response_location() {
        let mut response = AdminResponse::new(StatusCode::CREATED);
        response.headers.insert(
            reqwest::header::LOCATION,
            HeaderValue::from_static("http://localhost/admin/realms/master/users/42"),
        );

        assert_eq!(
            response.location(),
            Some("http://localhost/admin/realms/master/users/42")
        );
    }
}
