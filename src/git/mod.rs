//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the repository
//! operations git-story needs, allowing for multiple implementations
//! including real Git repositories and mock implementations for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A mock implementation for testing
//!
//! # Usage
//!
//! Pipeline components hold an `Arc<dyn Repository>` rather than a concrete
//! implementation so tests can swap in the mock.
//!
//! ```rust,no_run
//! # use git_story::git::Repository;
//! # async fn example(repo: &dyn Repository) -> git_story::Result<()> {
//! let branch = repo.current_branch().await?;
//! let commits = repo.commits_between("origin/main", "HEAD").await?;
//! println!("{} has {} commits", branch, commits.len());
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{MockOperation, MockRepository};
pub use repository::Git2Repository;

use async_trait::async_trait;

use crate::domain::{CommitInfo, FileDelta};
use crate::error::Result;

/// Common git operation trait for abstraction
///
/// All methods are async; implementations backed by blocking libraries run
/// the work on a blocking thread.
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying errors (like `git2::Error`) to
/// [crate::error::GitStoryError::Repository]; callers add stage-specific
/// classification.
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): Real Git implementation using the `git2` crate
/// - [MockRepository](mock::MockRepository): Test implementation for mocking Git operations
#[async_trait]
pub trait Repository: Send + Sync {
    /// Name of the checked-out branch
    ///
    /// # Returns
    /// * `Ok(String)` - Short branch name, e.g. `add-login-page`
    /// * `Err` - If HEAD is unborn or detached
    async fn current_branch(&self) -> Result<String>;

    /// Commits reachable from `to` but not from `from`
    ///
    /// # Arguments
    /// * `from` - Revision to exclude, e.g. `origin/main`
    /// * `to` - Revision to include, usually `HEAD`
    ///
    /// # Returns
    /// * `Ok(Vec<CommitInfo>)` - Commits in chronological order (oldest first)
    /// * `Err` - If either revision cannot be resolved
    async fn commits_between(&self, from: &str, to: &str) -> Result<Vec<CommitInfo>>;

    /// Unified diff from the merge-base of `from` and `to` to `to`
    ///
    /// The text is capped at [crate::domain::MAX_DIFF_CHARS] characters.
    async fn diff_text(&self, from: &str, to: &str) -> Result<String>;

    /// Per-file line statistics for the same range as [Repository::diff_text]
    async fn diff_summary(&self, from: &str, to: &str) -> Result<Vec<FileDelta>>;

    /// Create `name` at HEAD and make it the checked-out branch
    async fn create_and_checkout_branch(&self, name: &str) -> Result<()>;

    /// Push a local branch to `remote` under the same name
    ///
    /// # Arguments
    /// * `remote` - Name of the remote (e.g., "origin")
    /// * `branch` - Local branch to publish
    /// * `set_upstream` - Record `remote/branch` as the upstream
    async fn push_branch(&self, remote: &str, branch: &str, set_upstream: bool) -> Result<()>;

    /// Delete a local branch. Fails if the branch is checked out.
    async fn delete_local_branch(&self, name: &str) -> Result<()>;

    /// Delete a branch on `remote`
    async fn delete_remote_branch(&self, remote: &str, name: &str) -> Result<()>;
}
