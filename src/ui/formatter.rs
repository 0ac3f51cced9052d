//! Pure formatting functions for UI output.
//!
//! Everything the user sees goes through here. Diagnostics go to `tracing`
//! instead.

use crate::boundary::BoundaryWarning;
use crate::cli::PipelineReport;
use crate::domain::{ChangeSet, WorkItemDraft};
use crate::error::SkipReason;

const MAX_LISTED_COMMITS: usize = 10;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("\x1b[31mERROR:\x1b[0m {}", message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("\x1b[32m✓\x1b[0m {}", message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("\x1b[33m→\x1b[0m {}", message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("\x1b[33m⚠ WARNING:\x1b[0m {}", warning);
}

/// Tell the user why nothing was done. The push continues.
pub fn display_skip(reason: &SkipReason) {
    display_status(&format!("{}; continuing with push", reason));
}

/// Display the commits of a change-set.
///
/// Shows up to 10 commits; the remainder is summarized as a count.
pub fn display_change_set(change_set: &ChangeSet) {
    println!(
        "\n\x1b[1mChanges on branch '{}'\x1b[0m",
        change_set.branch()
    );
    println!(
        "\x1b[4m{} commit(s), {} file(s), +{}/-{}:\x1b[0m",
        change_set.commits().len(),
        change_set.files().len(),
        change_set.insertions(),
        change_set.deletions()
    );

    for (i, commit) in change_set
        .commits()
        .iter()
        .take(MAX_LISTED_COMMITS)
        .enumerate()
    {
        let summary: String = commit.summary().chars().take(60).collect();
        println!("  {}. {} {}", i + 1, commit.hash, summary);
    }

    if change_set.commits().len() > MAX_LISTED_COMMITS {
        println!(
            "  ... and {} more commits",
            change_set.commits().len() - MAX_LISTED_COMMITS
        );
    }
}

/// Display a synthesized draft.
pub fn display_draft(draft: &WorkItemDraft) {
    println!("\n\x1b[1mStory draft:\x1b[0m");
    println!("  Title:      \x1b[32m{}\x1b[0m", draft.title);
    println!("  Type:       {}", draft.kind);
    println!("  Estimate:   {} point(s)", draft.estimate);
    if !draft.labels.is_empty() {
        let labels: Vec<&str> = draft.labels.iter().map(String::as_str).collect();
        println!("  Labels:     {}", labels.join(", "));
    }
    println!("  Confidence: {}%", draft.confidence_percent());
    println!();
    for line in draft.description.lines() {
        println!("    {}", line);
    }
}

/// Display the result of a completed run, including how to re-push.
pub fn display_pipeline_success(report: &PipelineReport) {
    display_success(&format!(
        "Created {} ({}% confidence)",
        report.issue.display_key,
        report.confidence_percent()
    ));
    println!("  \x1b[36m{}\x1b[0m", report.issue.url);
    display_success(&format!(
        "Renamed branch '{}' to '{}'",
        report.branch.previous, report.branch.name
    ));

    for warning in &report.warnings {
        display_boundary_warning(warning);
    }

    display_repush_instruction(&report.branch.name);
}

/// The original push is aborted after a rename; show how to push again.
pub fn display_repush_instruction(branch: &str) {
    println!(
        "\n\x1b[33m→\x1b[0m The original push was stopped. Push the renamed branch with:\n  \x1b[36mgit push\x1b[0m   (now on '{}')",
        branch
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_error() {
        // Visual verification test - output is printed to stderr
        display_error("test error");
    }

    #[test]
    fn test_display_success() {
        // Visual verification test - output is printed to stdout
        display_success("test success");
    }

    #[test]
    fn test_display_skip() {
        display_skip(&SkipReason::NoChanges {
            branch: "feature".to_string(),
            base: "main".to_string(),
        });
    }
}
