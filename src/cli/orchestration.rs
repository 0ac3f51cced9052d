//! Pipeline orchestration
//!
//! Runs extraction, synthesis, issue creation and branch rewriting in order.
//! Kept apart from `main` so the whole workflow can be driven with test
//! doubles and without clap.

use std::sync::Arc;

use tracing::{debug, info};

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::{ChangeSet, CreatedIssue, Provenance, WorkItemDraft};
use crate::error::{GitStoryError, Result, SkipReason};
use crate::extractor::ChangeSetExtractor;
use crate::git::Repository;
use crate::rewriter::{BranchRewriter, RenamedBranch};
use crate::synth::{Synthesizer, TextGenerator};
use crate::tracker::TrackerGateway;

/// Remote the renamed branch is published to
pub const DEFAULT_REMOTE: &str = "origin";

/// Result of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub issue: CreatedIssue,
    pub branch: RenamedBranch,
    pub draft: WorkItemDraft,
    pub warnings: Vec<BoundaryWarning>,
}

impl PipelineReport {
    /// Synthesizer confidence as a whole percentage
    pub fn confidence_percent(&self) -> u8 {
        self.draft.confidence_percent()
    }
}

/// How a run ended, as seen by the process
#[derive(Debug)]
pub enum Outcome {
    Completed(PipelineReport),
    Skipped(SkipReason),
    Failed(GitStoryError),
}

impl Outcome {
    pub fn classify(result: Result<PipelineReport>) -> Self {
        match result {
            Ok(report) => Outcome::Completed(report),
            Err(GitStoryError::Skip(reason)) => Outcome::Skipped(reason),
            Err(e) => Outcome::Failed(e),
        }
    }

    /// Process exit code.
    ///
    /// A completed run exits non-zero so git aborts the push of the old
    /// branch name; the user pushes again from the renamed branch.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Skipped(_) => 0,
            Outcome::Failed(_) => 1,
            Outcome::Completed(_) => 1,
        }
    }
}

pub struct Pipeline {
    extractor: ChangeSetExtractor,
    synthesizer: Synthesizer,
    gateway: TrackerGateway,
    rewriter: BranchRewriter,
}

impl Pipeline {
    pub fn new(
        config: Config,
        repo: Arc<dyn Repository>,
        generator: Option<Arc<dyn TextGenerator>>,
        gateway: TrackerGateway,
    ) -> Self {
        Pipeline {
            extractor: ChangeSetExtractor::new(
                repo.clone(),
                config.base_branch,
                config.skip_branches,
            ),
            synthesizer: Synthesizer::new(generator),
            gateway,
            rewriter: BranchRewriter::new(repo, DEFAULT_REMOTE),
        }
    }

    /// Extract and synthesize without touching the tracker or the repository
    pub async fn analyze(&self) -> Result<(ChangeSet, WorkItemDraft)> {
        let change_set = self.extractor.extract().await?;
        let draft = self.synthesizer.synthesize(&change_set).await;
        debug!(
            title = %draft.title,
            fallback = draft.is_fallback(),
            "Draft ready"
        );
        Ok((change_set, draft))
    }

    /// Run the full workflow
    pub async fn run(&self) -> Result<PipelineReport> {
        let (change_set, draft) = self.analyze().await?;
        let issue = self.gateway.create_issue(&draft).await?;
        let branch = self.rewriter.rewrite(change_set.branch(), &issue.id).await?;

        info!(
            issue = %issue.display_key,
            branch = %branch.name,
            "Pipeline completed"
        );

        let warnings = collect_warnings(&draft, &issue, &branch);
        Ok(PipelineReport {
            issue,
            branch,
            draft,
            warnings,
        })
    }
}

fn collect_warnings(
    draft: &WorkItemDraft,
    issue: &CreatedIssue,
    branch: &RenamedBranch,
) -> Vec<BoundaryWarning> {
    let mut warnings = Vec::new();

    if let Provenance::Fallback { reason } = &draft.provenance {
        warnings.push(BoundaryWarning::FallbackDraftUsed {
            reason: reason.clone(),
        });
    }

    if let Some(sprint) = issue.sprint.as_ref().filter(|s| !s.assigned) {
        warnings.push(BoundaryWarning::SprintAssignmentFailed {
            issue: issue.display_key.clone(),
            sprint_id: sprint.sprint_id,
            detail: sprint.detail.clone().unwrap_or_default(),
        });
    }

    for report in branch.failed_cleanup() {
        warnings.push(BoundaryWarning::CleanupFailed {
            step: report.step.clone(),
            detail: report.error.clone().unwrap_or_default(),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::branch::Ineligibility;

    #[test]
    fn test_exit_codes() {
        let skipped = Outcome::classify(Err(GitStoryError::Skip(SkipReason::IneligibleBranch {
            branch: "main".to_string(),
            reason: Ineligibility::SkipListed,
        })));
        assert!(matches!(skipped, Outcome::Skipped(_)));
        assert_eq!(skipped.exit_code(), 0);

        let failed = Outcome::classify(Err(GitStoryError::TrackerTransport("down".to_string())));
        assert!(matches!(failed, Outcome::Failed(_)));
        assert_eq!(failed.exit_code(), 1);
    }

    #[test]
    fn test_classification_ignores_message_text() {
        let outcome = Outcome::classify(Err(GitStoryError::config("skipped branch main")));
        assert!(matches!(outcome, Outcome::Failed(_)));
    }
}
