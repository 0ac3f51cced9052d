//! Rule-based drafts used when generation is unavailable or unusable

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::domain::draft::truncate_title;
use crate::domain::{ChangeSet, Provenance, StoryKind, StoryPoints, WorkItemDraft};

/// Confidence attached to every rule-based draft
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

const UI_EXTENSIONS: [&str; 9] = [
    "tsx", "jsx", "vue", "svelte", "css", "scss", "sass", "less", "html",
];

/// Derive a draft from the change-set alone.
///
/// Pure: the same change-set always yields the same draft.
pub fn draft(change_set: &ChangeSet) -> WorkItemDraft {
    WorkItemDraft {
        title: truncate_title(&format!("Changes from branch {}", change_set.branch())),
        description: describe(change_set),
        kind: kind(change_set),
        estimate: estimate(change_set.files().len()),
        labels: labels(change_set),
        confidence: FALLBACK_CONFIDENCE,
        provenance: Provenance::Fallback {
            reason: "rule-based draft".to_string(),
        },
    }
}

fn kind(change_set: &ChangeSet) -> StoryKind {
    if change_set.commits().iter().any(|c| c.mentions_fix()) {
        StoryKind::Bug
    } else {
        StoryKind::Feature
    }
}

fn estimate(file_count: usize) -> StoryPoints {
    if file_count > 10 {
        StoryPoints::FIVE
    } else if file_count > 5 {
        StoryPoints::THREE
    } else {
        StoryPoints::ONE
    }
}

fn labels(change_set: &ChangeSet) -> BTreeSet<String> {
    let paths: Vec<String> = change_set
        .files()
        .iter()
        .map(|f| f.path.to_lowercase())
        .collect();

    let mut labels = BTreeSet::new();

    if paths.iter().any(|p| is_ui_file(p)) {
        labels.insert("frontend".to_string());
    }
    if paths
        .iter()
        .any(|p| p.contains("api") || p.contains("controller"))
    {
        labels.insert("backend".to_string());
    }
    if paths.iter().any(|p| p.contains("test") || p.contains("spec")) {
        labels.insert("testing".to_string());
    }

    labels
}

fn is_ui_file(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| UI_EXTENSIONS.contains(&ext))
}

fn describe(change_set: &ChangeSet) -> String {
    let mut description = String::new();

    let _ = writeln!(
        description,
        "Changes from branch `{}` ({} commit(s), +{}/-{} lines).",
        change_set.branch(),
        change_set.commits().len(),
        change_set.insertions(),
        change_set.deletions()
    );
    let _ = writeln!(description);

    let _ = writeln!(description, "Files changed ({}):", change_set.files().len());
    for (i, file) in change_set.files().iter().enumerate() {
        let _ = writeln!(
            description,
            "{}. {} (+{}/-{}, {})",
            i + 1,
            file.path,
            file.insertions,
            file.deletions,
            file.status
        );
    }
    let _ = writeln!(description);

    let _ = writeln!(description, "Commits ({}):", change_set.commits().len());
    for (i, commit) in change_set.commits().iter().enumerate() {
        let _ = writeln!(
            description,
            "{}. {} {}",
            i + 1,
            commit.hash,
            commit.summary()
        );
    }

    description.trim_end().to_string()
}
