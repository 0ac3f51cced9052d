//! HTTP transport abstraction
//!
//! The generation client and both tracker adapters describe their calls as
//! [ApiRequest] values and hand them to an [HttpTransport]. The concrete
//! implementations are:
//!
//! - [ReqwestTransport]: real HTTP via `reqwest`
//! - [mock::ScriptedTransport]: canned replies for tests
//!
//! A transport only fails when no response arrived at all. Non-2xx statuses
//! come back as an [ApiResponse]; deciding what they mean is the caller's job.

pub mod mock;

pub use mock::ScriptedTransport;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;

/// No response was received (DNS, connection refused, TLS, timeout)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError(err.to_string())
    }
}

/// A single outgoing API call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Username and password for HTTP basic auth
    pub basic_auth: Option<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        ApiRequest {
            method,
            url: url.into(),
            headers: Vec::new(),
            basic_auth: None,
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((username.into(), password.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of the first header with this name, ignoring case
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and raw body of a received response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        ApiResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends [ApiRequest]s. Implementors must be `Send + Sync`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// [HttpTransport] backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("git-story/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(ReqwestTransport { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        tracing::debug!(method = %request.method, url = %request.url, "Sending request");

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .header("Accept", "application/json");

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some((username, password)) = &request.basic_auth {
            builder = builder.basic_auth(username, Some(password));
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(status, "Received response");

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::post("https://example.test/items")
            .header("X-Token", "abc")
            .bearer("secret")
            .json(json!({"name": "x"}));

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.header_value("x-token"), Some("abc"));
        assert_eq!(request.header_value("Authorization"), Some("Bearer secret"));
        assert_eq!(request.body, Some(json!({"name": "x"})));
        assert!(request.basic_auth.is_none());
    }

    #[test]
    fn test_basic_auth() {
        let request = ApiRequest::get("https://example.test").basic_auth("me@x.io", "tok");
        assert_eq!(
            request.basic_auth,
            Some(("me@x.io".to_string(), "tok".to_string()))
        );
    }

    #[test]
    fn test_response_success_range() {
        assert!(ApiResponse::new(200, "").is_success());
        assert!(ApiResponse::new(201, "").is_success());
        assert!(ApiResponse::new(204, "").is_success());
        assert!(!ApiResponse::new(302, "").is_success());
        assert!(!ApiResponse::new(400, "").is_success());
        assert!(!ApiResponse::new(500, "").is_success());
    }

    #[test]
    fn test_reqwest_transport_builds() {
        assert!(ReqwestTransport::new().is_ok());
    }
}
