use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::change_set::truncate_diff;
use crate::domain::{CommitInfo, FileDelta};
use crate::error::{GitStoryError, Result};
use crate::git::Repository;

/// Operations that can be made to fail on a [MockRepository]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    CurrentBranch,
    CommitsBetween,
    DiffText,
    DiffSummary,
    CreateAndCheckoutBranch,
    PushBranch,
    DeleteLocalBranch,
    DeleteRemoteBranch,
}

#[derive(Debug, Default)]
struct MockState {
    head: Option<String>,
    local_branches: BTreeSet<String>,
    remote_branches: BTreeSet<String>,
    upstreams: Vec<(String, String)>,
    calls: Vec<String>,
}

/// Mock repository for testing without actual git operations
///
/// Read operations return the configured commits, files and diff for any
/// range. Write operations update an in-memory view of local and remote
/// branches and every call is recorded.
#[derive(Debug, Default)]
pub struct MockRepository {
    commits: Vec<CommitInfo>,
    files: Vec<FileDelta>,
    diff: String,
    failures: HashSet<MockOperation>,
    state: Mutex<MockState>,
}

impl MockRepository {
    /// Create a mock with `branch` checked out locally and on the remote
    pub fn new(branch: impl Into<String>) -> Self {
        let branch = branch.into();
        let repo = MockRepository::default();
        {
            let mut state = repo.state();
            state.local_branches.insert(branch.clone());
            state.remote_branches.insert(branch.clone());
            state.head = Some(branch);
        }
        repo
    }

    /// Create a mock whose HEAD is detached
    pub fn detached() -> Self {
        MockRepository::default()
    }

    /// Add a commit to the branch log
    pub fn with_commit(mut self, commit: CommitInfo) -> Self {
        self.commits.push(commit);
        self
    }

    /// Add a changed file to the diff summary
    pub fn with_file(mut self, file: FileDelta) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
        self.diff = diff.into();
        self
    }

    /// Make an operation return a repository error
    pub fn failing(mut self, operation: MockOperation) -> Self {
        self.failures.insert(operation);
        self
    }

    /// The branch HEAD points at, if any
    pub fn head(&self) -> Option<String> {
        self.state().head.clone()
    }

    pub fn local_branches(&self) -> BTreeSet<String> {
        self.state().local_branches.clone()
    }

    pub fn remote_branches(&self) -> BTreeSet<String> {
        self.state().remote_branches.clone()
    }

    /// `(branch, remote)` pairs recorded by upstream pushes
    pub fn upstreams(&self) -> Vec<(String, String)> {
        self.state().upstreams.clone()
    }

    /// Recorded calls, e.g. `push_branch origin sc-1-x`
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, operation: MockOperation, call: String) -> Result<()> {
        self.state().calls.push(call.clone());
        if self.failures.contains(&operation) {
            Err(GitStoryError::repository(format!("mock failure: {}", call)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Repository for MockRepository {
    async fn current_branch(&self) -> Result<String> {
        self.record(MockOperation::CurrentBranch, "current_branch".to_string())?;
        self.head()
            .ok_or_else(|| GitStoryError::repository("HEAD is detached; check out a branch first"))
    }

    async fn commits_between(&self, from: &str, to: &str) -> Result<Vec<CommitInfo>> {
        self.record(
            MockOperation::CommitsBetween,
            format!("commits_between {} {}", from, to),
        )?;
        Ok(self.commits.clone())
    }

    async fn diff_text(&self, from: &str, to: &str) -> Result<String> {
        self.record(MockOperation::DiffText, format!("diff_text {} {}", from, to))?;
        Ok(truncate_diff(&self.diff))
    }

    async fn diff_summary(&self, from: &str, to: &str) -> Result<Vec<FileDelta>> {
        self.record(
            MockOperation::DiffSummary,
            format!("diff_summary {} {}", from, to),
        )?;
        Ok(self.files.clone())
    }

    async fn create_and_checkout_branch(&self, name: &str) -> Result<()> {
        self.record(
            MockOperation::CreateAndCheckoutBranch,
            format!("create_and_checkout_branch {}", name),
        )?;

        let mut state = self.state();
        if !state.local_branches.insert(name.to_string()) {
            return Err(GitStoryError::repository(format!(
                "a branch named '{}' already exists",
                name
            )));
        }
        state.head = Some(name.to_string());
        Ok(())
    }

    async fn push_branch(&self, remote: &str, branch: &str, set_upstream: bool) -> Result<()> {
        self.record(
            MockOperation::PushBranch,
            format!("push_branch {} {}", remote, branch),
        )?;

        let mut state = self.state();
        state.remote_branches.insert(branch.to_string());
        if set_upstream {
            state.upstreams.push((branch.to_string(), remote.to_string()));
        }
        Ok(())
    }

    async fn delete_local_branch(&self, name: &str) -> Result<()> {
        self.record(
            MockOperation::DeleteLocalBranch,
            format!("delete_local_branch {}", name),
        )?;

        let mut state = self.state();
        if state.head.as_deref() == Some(name) {
            return Err(GitStoryError::repository(format!(
                "cannot delete branch '{}' checked out",
                name
            )));
        }
        if !state.local_branches.remove(name) {
            return Err(GitStoryError::repository(format!(
                "branch '{}' not found",
                name
            )));
        }
        Ok(())
    }

    async fn delete_remote_branch(&self, remote: &str, name: &str) -> Result<()> {
        self.record(
            MockOperation::DeleteRemoteBranch,
            format!("delete_remote_branch {} {}", remote, name),
        )?;

        self.state().remote_branches.remove(name);
        Ok(())
    }
}
