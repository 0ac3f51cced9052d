use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{decode, send};
use crate::config::ShortcutConfig;
use crate::domain::{CreatedIssue, IssueId, WorkItemDraft};
use crate::error::Result;
use crate::http::{ApiRequest, HttpTransport};

pub const API_BASE: &str = "https://api.app.shortcut.com/api/v3";
const TOKEN_HEADER: &str = "Shortcut-Token";

#[derive(Debug, Deserialize)]
struct StoryResponse {
    id: u64,
    app_url: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MemberResponse {
    profile: MemberProfile,
}

#[derive(Debug, Deserialize)]
struct MemberProfile {
    name: Option<String>,
    mention_name: Option<String>,
}

/// Request body for `POST /stories`
pub fn story_body(config: &ShortcutConfig, draft: &WorkItemDraft) -> Value {
    let mut body = json!({
        "name": draft.title,
        "description": draft.description,
        "story_type": draft.kind.as_str(),
        "estimate": draft.estimate.value(),
        "labels": draft
            .labels
            .iter()
            .map(|name| json!({ "name": name }))
            .collect::<Vec<_>>(),
    });

    if let Some(state) = config.workflow_state_id {
        body["workflow_state_id"] = json!(state);
    }
    if let Some(group) = &config.group_id {
        body["group_id"] = json!(group);
    }
    body
}

pub(crate) async fn create_story(
    transport: &dyn HttpTransport,
    config: &ShortcutConfig,
    draft: &WorkItemDraft,
) -> Result<CreatedIssue> {
    let request = ApiRequest::post(format!("{}/stories", API_BASE))
        .header(TOKEN_HEADER, &config.token)
        .json(story_body(config, draft));

    let response = send(transport, request).await?;
    let story: StoryResponse = decode(&response)?;
    debug!(id = story.id, "Shortcut story created");

    Ok(CreatedIssue {
        id: IssueId::Numeric(story.id),
        url: story.app_url,
        display_key: story.name,
        kind: draft.kind,
        sprint: None,
    })
}

pub(crate) async fn current_member(
    transport: &dyn HttpTransport,
    config: &ShortcutConfig,
) -> Result<String> {
    let request =
        ApiRequest::get(format!("{}/member", API_BASE)).header(TOKEN_HEADER, &config.token);
    let response = send(transport, request).await?;
    let member: MemberResponse = decode(&response)?;

    Ok(member
        .profile
        .name
        .or(member.profile.mention_name)
        .unwrap_or_else(|| "unknown member".to_string()))
}
