use std::fmt;

/// Non-fatal conditions hit during a successful run.
/// These are reported to the user next to the result.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The story was written by the rule-based fallback
    FallbackDraftUsed { reason: String },
    /// The Jira issue was created but could not be added to the sprint
    SprintAssignmentFailed {
        issue: String,
        sprint_id: u64,
        detail: String,
    },
    /// The old branch could not be removed after the rename
    CleanupFailed { step: String, detail: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::FallbackDraftUsed { reason } => {
                write!(f, "Story generated from rules, not AI ({})", reason)
            }
            BoundaryWarning::SprintAssignmentFailed {
                issue,
                sprint_id,
                detail,
            } => {
                write!(
                    f,
                    "Issue {} was not added to sprint {}: {}",
                    issue, sprint_id, detail
                )
            }
            BoundaryWarning::CleanupFailed { step, detail } => {
                write!(f, "Could not {}: {}", step, detail)
            }
        }
    }
}
