use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{decode, send};
use crate::config::JiraConfig;
use crate::domain::{CreatedIssue, IssueId, SprintAssignment, WorkItemDraft};
use crate::error::Result;
use crate::http::{ApiRequest, HttpTransport};

#[derive(Debug, Deserialize)]
struct IssueResponse {
    key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserResponse {
    display_name: Option<String>,
    email_address: Option<String>,
}

/// Jira issue type for a story kind; unknown kinds become `Task`
pub fn issue_type_for(kind: &str) -> &'static str {
    match kind {
        "feature" => "Story",
        "bug" => "Bug",
        "chore" => "Task",
        _ => "Task",
    }
}

/// Jira labels may not contain spaces
pub fn label(name: &str) -> String {
    name.replace(' ', "-")
}

/// Wrap plain text in a minimal Atlassian Document Format document
pub fn adf_document(text: &str) -> Value {
    let paragraphs: Vec<Value> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| json!({ "type": "paragraph", "content": [{ "type": "text", "text": p }] }))
        .collect();

    json!({ "type": "doc", "version": 1, "content": paragraphs })
}

fn base_url(config: &JiraConfig) -> &str {
    config.base_url.trim_end_matches('/')
}

/// Browser URL of an issue
pub fn browse_url(config: &JiraConfig, key: &str) -> String {
    format!("{}/browse/{}", base_url(config), key)
}

/// Request body for `POST /rest/api/3/issue`
pub fn issue_body(config: &JiraConfig, draft: &WorkItemDraft) -> Value {
    let mut fields = json!({
        "project": { "key": config.project_key },
        "summary": draft.title,
        "description": adf_document(&draft.description),
        "issuetype": { "name": issue_type_for(draft.kind.as_str()) },
        "labels": draft.labels.iter().map(|l| label(l)).collect::<Vec<_>>(),
    });

    if let Some(field) = &config.story_points_field {
        fields[field.as_str()] = json!(draft.estimate.value());
    }

    json!({ "fields": fields })
}

fn authorized(config: &JiraConfig, request: ApiRequest) -> ApiRequest {
    request.basic_auth(&config.email, &config.api_token)
}

pub(crate) async fn create_issue(
    transport: &dyn HttpTransport,
    config: &JiraConfig,
    draft: &WorkItemDraft,
) -> Result<CreatedIssue> {
    let request = authorized(
        config,
        ApiRequest::post(format!("{}/rest/api/3/issue", base_url(config))),
    )
    .json(issue_body(config, draft));

    let response = send(transport, request).await?;
    let issue: IssueResponse = decode(&response)?;
    debug!(key = %issue.key, "Jira issue created");

    let sprint = match config.sprint_id {
        Some(sprint_id) => Some(assign_to_sprint(transport, config, sprint_id, &issue.key).await),
        None => None,
    };

    Ok(CreatedIssue {
        id: IssueId::Key(issue.key.clone()),
        url: browse_url(config, &issue.key),
        display_key: issue.key,
        kind: draft.kind,
        sprint,
    })
}

/// Move the issue into a sprint. Failure is reported, never returned.
async fn assign_to_sprint(
    transport: &dyn HttpTransport,
    config: &JiraConfig,
    sprint_id: u64,
    key: &str,
) -> SprintAssignment {
    let request = authorized(
        config,
        ApiRequest::post(format!(
            "{}/rest/agile/1.0/sprint/{}/issue",
            base_url(config),
            sprint_id
        )),
    )
    .json(json!({ "issues": [key] }));

    match send(transport, request).await {
        Ok(_) => {
            debug!(key, sprint_id, "Issue added to sprint");
            SprintAssignment {
                sprint_id,
                assigned: true,
                detail: None,
            }
        }
        Err(e) => {
            warn!(key, sprint_id, error = %e, "Could not add issue to sprint");
            SprintAssignment {
                sprint_id,
                assigned: false,
                detail: Some(e.to_string()),
            }
        }
    }
}

pub(crate) async fn current_user(
    transport: &dyn HttpTransport,
    config: &JiraConfig,
) -> Result<String> {
    let request = authorized(
        config,
        ApiRequest::get(format!("{}/rest/api/3/myself", base_url(config))),
    );
    let response = send(transport, request).await?;
    let user: UserResponse = decode(&response)?;

    Ok(user
        .display_name
        .or(user.email_address)
        .unwrap_or_else(|| config.email.clone()))
}
