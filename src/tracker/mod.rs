//! Tracker gateway
//!
//! Creates work items in the configured tracker. Each tracker is a variant of
//! [TrackerConfig]; dispatch is an exhaustive match, so adding a tracker means
//! adding a variant and handling it here.

pub mod jira;
pub mod shortcut;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::config::TrackerConfig;
use crate::domain::{CreatedIssue, WorkItemDraft};
use crate::error::{GitStoryError, Result};
use crate::http::{ApiRequest, ApiResponse, HttpTransport};

/// Entry point for everything tracker-related
pub struct TrackerGateway {
    config: TrackerConfig,
    transport: Arc<dyn HttpTransport>,
}

impl TrackerGateway {
    /// Create a gateway, validating the tracker config up front
    pub fn new(config: TrackerConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        config.validate()?;
        Ok(TrackerGateway { config, transport })
    }

    /// Tracker name as written in the config file
    pub fn name(&self) -> &'static str {
        self.config.name()
    }

    /// Create a work item from `draft`
    pub async fn create_issue(&self, draft: &WorkItemDraft) -> Result<CreatedIssue> {
        let issue = match &self.config {
            TrackerConfig::Shortcut(config) => {
                shortcut::create_story(self.transport.as_ref(), config, draft).await?
            }
            TrackerConfig::Jira(config) => {
                jira::create_issue(self.transport.as_ref(), config, draft).await?
            }
        };

        info!(
            tracker = self.name(),
            key = %issue.display_key,
            url = %issue.url,
            "Created work item"
        );
        Ok(issue)
    }

    /// Check the configured credentials; returns the authenticated user's name
    pub async fn validate_credentials(&self) -> Result<String> {
        match &self.config {
            TrackerConfig::Shortcut(config) => {
                shortcut::current_member(self.transport.as_ref(), config).await
            }
            TrackerConfig::Jira(config) => {
                jira::current_user(self.transport.as_ref(), config).await
            }
        }
    }
}

/// Send a tracker request, mapping failures into tracker errors.
///
/// No response becomes [GitStoryError::TrackerTransport]; a non-2xx status
/// becomes [GitStoryError::TrackerApi].
pub(crate) async fn send(
    transport: &dyn HttpTransport,
    request: ApiRequest,
) -> Result<ApiResponse> {
    let response = transport
        .execute(request)
        .await
        .map_err(|e| GitStoryError::TrackerTransport(e.0))?;

    if !response.is_success() {
        return Err(GitStoryError::tracker_api(response.status, response.body));
    }
    Ok(response)
}

/// Decode a successful response body
pub(crate) fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T> {
    serde_json::from_str(&response.body)
        .map_err(|_| GitStoryError::tracker_api(response.status, response.body.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JiraConfig, ShortcutConfig};
    use crate::http::ScriptedTransport;
    use reqwest::Method;

    #[test]
    fn test_new_rejects_incomplete_config() {
        let transport = Arc::new(ScriptedTransport::new());
        let result = TrackerGateway::new(
            TrackerConfig::Jira(JiraConfig {
                base_url: "https://acme.atlassian.net".to_string(),
                ..JiraConfig::default()
            }),
            transport.clone(),
        );
        assert!(matches!(result, Err(GitStoryError::Config(_))));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_send_maps_status_and_transport_failures() {
        let transport = ScriptedTransport::new()
            .respond(Method::GET, "/bad", 401, "unauthorized")
            .fail(Method::GET, "/down", "connection reset");

        let err = send(&transport, ApiRequest::get("https://t.test/bad"))
            .await
            .unwrap_err();
        assert!(matches!(err, GitStoryError::TrackerApi { status: 401, .. }));

        let err = send(&transport, ApiRequest::get("https://t.test/down"))
            .await
            .unwrap_err();
        assert!(matches!(err, GitStoryError::TrackerTransport(_)));
    }

    #[tokio::test]
    async fn test_decode_failure_keeps_body() {
        let response = ApiResponse::new(200, "<html>oops</html>");
        let err = decode::<serde_json::Value>(&response).unwrap_err();
        match err {
            GitStoryError::TrackerApi { status, body } => {
                assert_eq!(status, 200);
                assert_eq!(body, "<html>oops</html>");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validate_credentials_dispatches_on_tracker() {
        let transport = Arc::new(ScriptedTransport::new().respond(
            Method::GET,
            "/api/v3/member",
            200,
            r#"{"id":"abc","profile":{"name":"Ada Lovelace","mention_name":"ada"}}"#,
        ));
        let gateway = TrackerGateway::new(
            TrackerConfig::Shortcut(ShortcutConfig {
                token: "tok".to_string(),
                ..ShortcutConfig::default()
            }),
            transport,
        )
        .unwrap();

        assert_eq!(gateway.name(), "shortcut");
        assert_eq!(gateway.validate_credentials().await.unwrap(), "Ada Lovelace");
    }
}
