use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;

use super::{ApiRequest, ApiResponse, HttpTransport, TransportError};

#[derive(Debug, Clone)]
enum Reply {
    Respond(ApiResponse),
    Fail(String),
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    url_fragment: String,
    reply: Reply,
}

/// Transport for testing without network access.
///
/// Requests are matched against routes by method and URL substring, first
/// match wins. A request with no matching route fails as if the host were
/// unreachable. Every request is recorded, matched or not.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Vec<Route>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    /// Create a transport with no routes; every request fails
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer matching requests with `status` and `body`
    pub fn respond(
        mut self,
        method: Method,
        url_fragment: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        self.routes.push(Route {
            method,
            url_fragment: url_fragment.into(),
            reply: Reply::Respond(ApiResponse::new(status, body)),
        });
        self
    }

    /// Fail matching requests with a transport error
    pub fn fail(
        mut self,
        method: Method,
        url_fragment: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.routes.push(Route {
            method,
            url_fragment: url_fragment.into(),
            reply: Reply::Fail(message.into()),
        });
        self
    }

    /// All requests received so far, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let reply = self
            .routes
            .iter()
            .find(|route| {
                route.method == request.method && request.url.contains(&route.url_fragment)
            })
            .map(|route| route.reply.clone());

        let url = request.url.clone();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(TransportError(message)),
            None => Err(TransportError(format!("connection refused: {}", url))),
        }
    }
}
