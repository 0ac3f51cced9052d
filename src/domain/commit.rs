use chrono::{DateTime, Utc};

/// Length of the abbreviated commit hash shown in prompts and descriptions
pub const SHORT_HASH_LEN: usize = 7;

/// A commit on the feature branch, normalized for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// The commit hash, abbreviated to seven characters
    pub hash: String,
    /// The commit message, trimmed
    pub message: String,
    /// The commit author
    pub author: String,
    /// Author time of the commit
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    /// Create a commit record, abbreviating the hash and trimming the message
    pub fn new(
        hash: &str,
        message: &str,
        author: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        CommitInfo {
            hash: abbreviate(hash),
            message: message.trim().to_string(),
            author: author.into(),
            timestamp,
        }
    }

    /// First line of the message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    /// Whether the message mentions a fix, in any case
    pub fn mentions_fix(&self) -> bool {
        self.message.to_lowercase().contains("fix")
    }
}

/// Shorten a full hash to [SHORT_HASH_LEN] characters
pub fn abbreviate(hash: &str) -> String {
    hash.chars().take(SHORT_HASH_LEN).collect()
}
