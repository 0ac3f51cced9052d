use std::fmt;

use regex::Regex;

use super::issue::IssueId;

/// Why a branch cannot be turned into a story
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    /// Name already starts with `sc-<n>` or `<KEY>-<n>`
    AlreadyPrefixed,
    /// Name is listed in `skip_branches`
    SkipListed,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligibility::AlreadyPrefixed => write!(f, "already carries an issue prefix"),
            Ineligibility::SkipListed => write!(f, "listed in skip_branches"),
        }
    }
}

/// Result of the eligibility check for the current branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Ineligible(Ineligibility),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// Check whether a branch name starts with a Shortcut (`sc-123`) or
/// tracker-key (`PROJ-123`) prefix.
pub fn has_issue_prefix(branch: &str) -> bool {
    [r"^sc-\d+", r"^[A-Z]+-\d+"].iter().any(|pattern| {
        Regex::new(pattern)
            .ok()
            .is_some_and(|re| re.is_match(branch))
    })
}

/// Decide whether a branch may be turned into a story.
///
/// A branch is ineligible when it is on the skip list or when it already
/// carries an issue prefix from a previous run.
pub fn check_eligibility(branch: &str, skip_list: &[String]) -> Eligibility {
    if skip_list.iter().any(|skipped| skipped == branch) {
        return Eligibility::Ineligible(Ineligibility::SkipListed);
    }

    if has_issue_prefix(branch) {
        return Eligibility::Ineligible(Ineligibility::AlreadyPrefixed);
    }

    Eligibility::Eligible
}

/// Normalize a branch name for use after an issue prefix.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single hyphen and drops hyphens at both ends.
pub fn sanitize(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !sanitized.is_empty() {
                sanitized.push('-');
            }
            pending_hyphen = false;
            sanitized.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    sanitized
}

/// Build the post-rewrite branch name `<issue-prefix>-<sanitized-name>`.
///
/// A name that already starts with the same prefix is not prefixed twice.
pub fn renamed_branch(id: &IssueId, current: &str) -> String {
    let prefix = id.branch_prefix();
    let sanitized = sanitize(current);
    let lowered = prefix.to_lowercase();
    let rest = match sanitized.strip_prefix(lowered.as_str()) {
        Some("") => "",
        Some(tail) => tail.strip_prefix('-').unwrap_or(sanitized.as_str()),
        None => sanitized.as_str(),
    };

    if rest.is_empty() {
        prefix
    } else {
        format!("{}-{}", prefix, rest)
    }
}
