use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Longest title accepted by either tracker, in characters
pub const MAX_TITLE_CHARS: usize = 100;

/// Kind of work item, in the domain vocabulary shared with Shortcut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryKind {
    Feature,
    Bug,
    Chore,
}

impl StoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryKind::Feature => "feature",
            StoryKind::Bug => "bug",
            StoryKind::Chore => "chore",
        }
    }
}

impl fmt::Display for StoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "feature" => Ok(StoryKind::Feature),
            "bug" => Ok(StoryKind::Bug),
            "chore" => Ok(StoryKind::Chore),
            other => Err(format!("unknown story type '{}'", other)),
        }
    }
}

/// Fibonacci-style estimate restricted to 1, 2, 3, 5 or 8
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StoryPoints(u8);

impl StoryPoints {
    pub const ONE: StoryPoints = StoryPoints(1);
    pub const TWO: StoryPoints = StoryPoints(2);
    pub const THREE: StoryPoints = StoryPoints(3);
    pub const FIVE: StoryPoints = StoryPoints(5);
    pub const EIGHT: StoryPoints = StoryPoints(8);

    pub const ALLOWED: [u8; 5] = [1, 2, 3, 5, 8];

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u64> for StoryPoints {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::ALLOWED
            .iter()
            .find(|&&allowed| u64::from(allowed) == value)
            .map(|&allowed| StoryPoints(allowed))
            .ok_or_else(|| format!("{} is not one of 1, 2, 3, 5, 8", value))
    }
}

impl fmt::Display for StoryPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which path produced a draft
#[derive(Debug, Clone, PartialEq)]
pub enum Provenance {
    /// The generation service returned a valid draft
    Generated { model: String },
    /// Rule-based draft; `reason` says why generation was not used
    Fallback { reason: String },
}

/// A synthesized work item, ready to be created in a tracker
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItemDraft {
    pub title: String,
    pub description: String,
    pub kind: StoryKind,
    pub estimate: StoryPoints,
    pub labels: BTreeSet<String>,
    /// Trust in the draft, within `[0, 1]`
    pub confidence: f64,
    pub provenance: Provenance,
}

impl WorkItemDraft {
    /// Confidence as a whole percentage
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.provenance, Provenance::Fallback { .. })
    }
}

/// Cut a title down to [MAX_TITLE_CHARS] characters
pub fn truncate_title(title: &str) -> String {
    title.trim().chars().take(MAX_TITLE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_kind_parsing() {
        assert_eq!("feature".parse::<StoryKind>(), Ok(StoryKind::Feature));
        assert_eq!(" Bug ".parse::<StoryKind>(), Ok(StoryKind::Bug));
        assert_eq!("CHORE".parse::<StoryKind>(), Ok(StoryKind::Chore));
        assert!("epic".parse::<StoryKind>().is_err());
    }

    #[test]
    fn test_story_kind_serializes_lowercase() {
        let json = serde_json::to_string(&StoryKind::Bug).unwrap();
        assert_eq!(json, "\"bug\"");
    }

    #[test]
    fn test_story_points_accepts_only_fibonacci_values() {
        for value in [1u64, 2, 3, 5, 8] {
            assert_eq!(StoryPoints::try_from(value).unwrap().value() as u64, value);
        }
        for value in [0u64, 4, 6, 7, 13, 100] {
            assert!(StoryPoints::try_from(value).is_err(), "{} accepted", value);
        }
    }

    #[test]
    fn test_truncate_title() {
        let long = "a".repeat(150);
        assert_eq!(truncate_title(&long).chars().count(), MAX_TITLE_CHARS);
        assert_eq!(truncate_title("  short  "), "short");
    }

    #[test]
    fn test_confidence_percent() {
        let draft = WorkItemDraft {
            title: "t".to_string(),
            description: "d".to_string(),
            kind: StoryKind::Feature,
            estimate: StoryPoints::ONE,
            labels: BTreeSet::new(),
            confidence: 0.3,
            provenance: Provenance::Fallback {
                reason: "test".to_string(),
            },
        };
        assert_eq!(draft.confidence_percent(), 30);
        assert!(draft.is_fallback());
    }
}
