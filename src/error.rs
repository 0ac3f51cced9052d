use std::fmt;

use thiserror::Error;

use crate::domain::branch::Ineligibility;

/// Unified error type for git-story operations
#[derive(Error, Debug)]
pub enum GitStoryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("{0}")]
    Skip(SkipReason),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Tracker API error ({status}): {body}")]
    TrackerApi { status: u16, body: String },

    #[error("Tracker request failed: {0}")]
    TrackerTransport(String),

    #[error("Branch rewrite failed: {0}")]
    BranchRewrite(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-story
pub type Result<T> = std::result::Result<T, GitStoryError>;

/// Why the pipeline decided there is nothing to do.
///
/// A skip is an outcome, not a failure: the orchestrator reports it and exits
/// cleanly so the user's push continues untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The branch already carries an issue prefix or is on the skip list
    IneligibleBranch {
        branch: String,
        reason: Ineligibility,
    },
    /// The branch has no commits beyond the base branch
    NoChanges { branch: String, base: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::IneligibleBranch { branch, reason } => {
                write!(f, "Branch '{}' is skipped: {}", branch, reason)
            }
            SkipReason::NoChanges { branch, base } => {
                write!(
                    f,
                    "No commits found on '{}' relative to origin/{}",
                    branch, base
                )
            }
        }
    }
}

impl From<git2::Error> for GitStoryError {
    fn from(err: git2::Error) -> Self {
        GitStoryError::Repository(err.message().to_string())
    }
}

impl From<toml::de::Error> for GitStoryError {
    fn from(err: toml::de::Error) -> Self {
        GitStoryError::Config(err.to_string())
    }
}

impl GitStoryError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitStoryError::Config(msg.into())
    }

    /// Create a repository error with context
    pub fn repository(msg: impl Into<String>) -> Self {
        GitStoryError::Repository(msg.into())
    }

    /// Create a generation error with context
    pub fn generation(msg: impl Into<String>) -> Self {
        GitStoryError::Generation(msg.into())
    }

    /// Create a branch rewrite error with context
    pub fn branch_rewrite(msg: impl Into<String>) -> Self {
        GitStoryError::BranchRewrite(msg.into())
    }

    /// Create a tracker API error from a response status and body
    pub fn tracker_api(status: u16, body: impl Into<String>) -> Self {
        GitStoryError::TrackerApi {
            status,
            body: body.into(),
        }
    }

    /// Whether this error means "nothing to do" rather than a failure
    pub fn is_skip(&self) -> bool {
        matches!(self, GitStoryError::Skip(_))
    }

    /// The skip reason, if this error is skip-classified
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            GitStoryError::Skip(reason) => Some(reason),
            _ => None,
        }
    }
}
