use std::fmt;

use super::commit::CommitInfo;

/// Upper bound on diff text handed to the synthesizer, in characters
pub const MAX_DIFF_CHARS: usize = 8000;

/// How a file changed between the base and the branch head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    TypeChanged,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Deleted => "deleted",
            FileStatus::Renamed => "renamed",
            FileStatus::Copied => "copied",
            FileStatus::TypeChanged => "type changed",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-file line statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDelta {
    pub path: String,
    pub insertions: usize,
    pub deletions: usize,
    pub status: FileStatus,
}

/// Commits and file changes between `origin/<base>` and the branch head.
///
/// Always holds at least one commit; [ChangeSet::new] refuses an empty log.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    branch: String,
    commits: Vec<CommitInfo>,
    files: Vec<FileDelta>,
    insertions: usize,
    deletions: usize,
    diff: String,
}

impl ChangeSet {
    /// Assemble a change-set, summing line totals and capping the diff.
    ///
    /// Returns `None` when `commits` is empty.
    pub fn new(
        branch: impl Into<String>,
        commits: Vec<CommitInfo>,
        files: Vec<FileDelta>,
        diff: &str,
    ) -> Option<Self> {
        if commits.is_empty() {
            return None;
        }

        let insertions = files.iter().map(|f| f.insertions).sum();
        let deletions = files.iter().map(|f| f.deletions).sum();

        Some(ChangeSet {
            branch: branch.into(),
            commits,
            files,
            insertions,
            deletions,
            diff: truncate_diff(diff),
        })
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Commits in chronological order, oldest first
    pub fn commits(&self) -> &[CommitInfo] {
        &self.commits
    }

    pub fn files(&self) -> &[FileDelta] {
        &self.files
    }

    pub fn insertions(&self) -> usize {
        self.insertions
    }

    pub fn deletions(&self) -> usize {
        self.deletions
    }

    /// Unified diff text, at most [MAX_DIFF_CHARS] characters
    pub fn diff(&self) -> &str {
        &self.diff
    }
}

/// Cap diff text at [MAX_DIFF_CHARS] characters without splitting a character
pub fn truncate_diff(diff: &str) -> String {
    match diff.char_indices().nth(MAX_DIFF_CHARS) {
        Some((byte_index, _)) => diff[..byte_index].to_string(),
        None => diff.to_string(),
    }
}
