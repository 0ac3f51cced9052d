use std::fmt;

use super::draft::StoryKind;

/// Identifier returned by a tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueId {
    /// Shortcut story id
    Numeric(u64),
    /// Jira issue key such as `PROJ-123`
    Key(String),
}

impl IssueId {
    /// Prefix placed in front of the renamed branch
    pub fn branch_prefix(&self) -> String {
        match self {
            IssueId::Numeric(id) => format!("sc-{}", id),
            IssueId::Key(key) => key.clone(),
        }
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueId::Numeric(id) => write!(f, "{}", id),
            IssueId::Key(key) => f.write_str(key),
        }
    }
}

/// Outcome of adding a Jira issue to the configured sprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintAssignment {
    pub sprint_id: u64,
    pub assigned: bool,
    /// Failure detail when `assigned` is false
    pub detail: Option<String>,
}

/// Tracker-agnostic record of a created work item
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedIssue {
    pub id: IssueId,
    pub url: String,
    pub display_key: String,
    pub kind: StoryKind,
    pub sprint: Option<SprintAssignment>,
}
