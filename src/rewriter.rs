//! Branch rewriting
//!
//! Renames the current branch to carry the issue prefix by creating the new
//! branch, publishing it, and then removing the old one. Only the first two
//! steps can fail the rewrite; removing the old branch is best-effort.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{renamed_branch, IssueId};
use crate::error::{GitStoryError, Result};
use crate::git::Repository;

/// Outcome of one best-effort step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub step: String,
    /// Failure detail; `None` when the step succeeded
    pub error: Option<String>,
}

impl CleanupReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Policy for steps whose failure must not fail the caller
pub struct BestEffort;

impl BestEffort {
    /// Run `step`, logging a failure at warn level instead of returning it
    pub async fn attempt<F>(label: impl Into<String>, step: F) -> CleanupReport
    where
        F: Future<Output = Result<()>>,
    {
        let label = label.into();
        match step.await {
            Ok(()) => CleanupReport {
                step: label,
                error: None,
            },
            Err(e) => {
                warn!(step = %label, error = %e, "Cleanup step failed");
                CleanupReport {
                    step: label,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Result of a successful rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedBranch {
    pub name: String,
    pub previous: String,
    pub cleanup: Vec<CleanupReport>,
}

impl RenamedBranch {
    /// Cleanup steps that did not succeed
    pub fn failed_cleanup(&self) -> impl Iterator<Item = &CleanupReport> {
        self.cleanup.iter().filter(|report| !report.succeeded())
    }
}

pub struct BranchRewriter {
    repo: Arc<dyn Repository>,
    remote: String,
}

impl BranchRewriter {
    pub fn new(repo: Arc<dyn Repository>, remote: impl Into<String>) -> Self {
        BranchRewriter {
            repo,
            remote: remote.into(),
        }
    }

    /// Rename `current` so that it starts with the prefix of `id`.
    ///
    /// # Returns
    /// * `Ok(RenamedBranch)` - The new branch exists locally and on the remote
    /// * `Err(BranchRewrite)` - Creating, checking out or pushing the new branch failed
    pub async fn rewrite(&self, current: &str, id: &IssueId) -> Result<RenamedBranch> {
        let name = renamed_branch(id, current);

        if name == current {
            info!(branch = %name, "Branch already carries the issue prefix");
            return Ok(RenamedBranch {
                name,
                previous: current.to_string(),
                cleanup: Vec::new(),
            });
        }

        self.repo
            .create_and_checkout_branch(&name)
            .await
            .map_err(|e| {
                GitStoryError::branch_rewrite(format!("could not create '{}': {}", name, e))
            })?;

        self.repo
            .push_branch(&self.remote, &name, true)
            .await
            .map_err(|e| {
                GitStoryError::branch_rewrite(format!(
                    "could not push '{}' to {}: {}",
                    name, self.remote, e
                ))
            })?;

        info!(from = %current, to = %name, remote = %self.remote, "Published renamed branch");

        let cleanup = vec![
            BestEffort::attempt(
                format!("delete local branch '{}'", current),
                self.repo.delete_local_branch(current),
            )
            .await,
            BestEffort::attempt(
                format!("delete {}/{}", self.remote, current),
                self.repo.delete_remote_branch(&self.remote, current),
            )
            .await,
        ];

        Ok(RenamedBranch {
            name,
            previous: current.to_string(),
            cleanup,
        })
    }
}
