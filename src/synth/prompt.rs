use std::fmt::Write;

use crate::domain::ChangeSet;

/// Fixed instruction sent with every generation request
pub const SYSTEM_PROMPT: &str = "You are an expert software engineer who analyzes git commits \
and diffs and turns them into clear, actionable user stories. \
Respond with valid JSON only: a single object, no prose, no code fences.";

/// Render the user prompt for a change-set.
///
/// The layout is fixed: branch, commits, per-file stats, totals, the capped
/// diff, then the expected response shape.
pub fn render(change_set: &ChangeSet) -> String {
    let mut prompt = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(prompt, "Analyze these git changes and write a user story.");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Branch: {}", change_set.branch());
    let _ = writeln!(prompt);

    let _ = writeln!(prompt, "Commits ({}):", change_set.commits().len());
    for commit in change_set.commits() {
        let _ = writeln!(
            prompt,
            "- {} {} ({})",
            commit.hash,
            commit.summary(),
            commit.author
        );
    }
    let _ = writeln!(prompt);

    let _ = writeln!(prompt, "Files changed ({}):", change_set.files().len());
    for file in change_set.files() {
        let _ = writeln!(
            prompt,
            "- {} (+{}/-{}, {})",
            file.path, file.insertions, file.deletions, file.status
        );
    }
    let _ = writeln!(prompt);

    let _ = writeln!(
        prompt,
        "Total: +{} insertions, -{} deletions",
        change_set.insertions(),
        change_set.deletions()
    );
    let _ = writeln!(prompt);

    let _ = writeln!(prompt, "Diff (truncated):");
    let _ = writeln!(prompt, "```diff");
    let _ = writeln!(prompt, "{}", change_set.diff());
    let _ = writeln!(prompt, "```");
    let _ = writeln!(prompt);

    prompt.push_str(RESPONSE_SHAPE);
    prompt
}

const RESPONSE_SHAPE: &str = r#"Respond with a JSON object of this shape:
{
  "title": "short imperative summary, at most 100 characters",
  "description": "what changed and why, in Markdown",
  "storyType": "feature" | "bug" | "chore",
  "estimatedPoints": 1 | 2 | 3 | 5 | 8,
  "suggestedLabels": ["frontend", "backend", ...],
  "confidence": number between 0 and 1
}
"#;
