//! Change-set extraction
//!
//! Reads the current branch, decides whether it is eligible for a story and
//! collects the commits and file changes relative to `origin/<base>`.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::branch::{check_eligibility, Eligibility};
use crate::domain::ChangeSet;
use crate::error::{GitStoryError, Result, SkipReason};
use crate::git::Repository;

/// Builds a [ChangeSet] for the checked-out branch
pub struct ChangeSetExtractor {
    repo: Arc<dyn Repository>,
    base_branch: String,
    skip_branches: Vec<String>,
}

impl ChangeSetExtractor {
    pub fn new(
        repo: Arc<dyn Repository>,
        base_branch: impl Into<String>,
        skip_branches: Vec<String>,
    ) -> Self {
        ChangeSetExtractor {
            repo,
            base_branch: base_branch.into(),
            skip_branches,
        }
    }

    /// Remote-tracking ref the branch is compared against
    pub fn base_ref(&self) -> String {
        format!("origin/{}", self.base_branch)
    }

    /// Extract the change-set of the current branch.
    ///
    /// # Returns
    /// * `Ok(ChangeSet)` - At least one commit ahead of the base
    /// * `Err(Skip)` - Branch is ineligible or has no commits
    /// * `Err(Repository)` - HEAD unreadable or detached, base ref missing
    pub async fn extract(&self) -> Result<ChangeSet> {
        let branch = self.repo.current_branch().await?;

        if let Eligibility::Ineligible(reason) = check_eligibility(&branch, &self.skip_branches) {
            debug!(branch = %branch, %reason, "Branch is not eligible");
            return Err(GitStoryError::Skip(SkipReason::IneligibleBranch {
                branch,
                reason,
            }));
        }

        let base_ref = self.base_ref();
        let (commits, diff, files) = tokio::try_join!(
            self.repo.commits_between(&base_ref, "HEAD"),
            self.repo.diff_text(&base_ref, "HEAD"),
            self.repo.diff_summary(&base_ref, "HEAD"),
        )?;

        info!(
            branch = %branch,
            base = %base_ref,
            commits = commits.len(),
            files = files.len(),
            "Collected branch changes"
        );

        ChangeSet::new(branch.clone(), commits, files, &diff).ok_or_else(|| {
            GitStoryError::Skip(SkipReason::NoChanges {
                branch,
                base: self.base_branch.clone(),
            })
        })
    }
}
