//! Narrative synthesis
//!
//! Turns a [ChangeSet] into a [WorkItemDraft]. A generation service is asked
//! first; when it is missing, unreachable, or returns something unusable, a
//! rule-based draft takes its place. Synthesis never fails.

pub mod fallback;
pub mod generator;
pub mod prompt;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::draft::truncate_title;
use crate::domain::{ChangeSet, Provenance, StoryKind, StoryPoints, WorkItemDraft};
use crate::error::{GitStoryError, Result};

pub use generator::{OpenAiGenerator, TextGenerator};

/// Confidence assumed when the service omits one
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Shape of the JSON object the generation service is asked for
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedStory {
    title: Option<String>,
    description: Option<String>,
    story_type: Option<String>,
    estimated_points: Option<Value>,
    #[serde(default)]
    suggested_labels: Vec<String>,
    confidence: Option<f64>,
}

/// Produces drafts, with or without a generation service
pub struct Synthesizer {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl Synthesizer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Synthesizer { generator }
    }

    /// Synthesizer that always uses the rule-based draft
    pub fn offline() -> Self {
        Synthesizer { generator: None }
    }

    /// Produce a draft for `change_set`.
    ///
    /// Any generation failure is logged and replaced by the fallback draft,
    /// whose provenance records why.
    pub async fn synthesize(&self, change_set: &ChangeSet) -> WorkItemDraft {
        let Some(generator) = &self.generator else {
            info!("No generation service configured, using rule-based draft");
            return with_reason(
                fallback::draft(change_set),
                "no generation service configured",
            );
        };

        match self.generate(generator.as_ref(), change_set).await {
            Ok(draft) => {
                info!(
                    model = generator.model(),
                    confidence = draft.confidence,
                    "Generated draft"
                );
                draft
            }
            Err(e) => {
                warn!(error = %e, "Generation failed, using rule-based draft");
                with_reason(fallback::draft(change_set), e.to_string())
            }
        }
    }

    async fn generate(
        &self,
        generator: &dyn TextGenerator,
        change_set: &ChangeSet,
    ) -> Result<WorkItemDraft> {
        let text = generator
            .generate(prompt::SYSTEM_PROMPT, &prompt::render(change_set))
            .await?;
        parse_draft(&text, generator.model())
    }
}

fn with_reason(mut draft: WorkItemDraft, reason: impl Into<String>) -> WorkItemDraft {
    draft.provenance = Provenance::Fallback {
        reason: reason.into(),
    };
    draft
}

/// Parse and validate a service response into a draft.
///
/// Tolerates a surrounding ```json fence. Missing or invalid required fields
/// are a [GitStoryError::Generation].
pub fn parse_draft(text: &str, model: &str) -> Result<WorkItemDraft> {
    let story: GeneratedStory = serde_json::from_str(extract_json(text))
        .map_err(|e| GitStoryError::generation(format!("response is not valid JSON: {}", e)))?;

    let title = story
        .title
        .as_deref()
        .map(truncate_title)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GitStoryError::generation("response has no title"))?;

    let description = story
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .ok_or_else(|| GitStoryError::generation("response has no description"))?;

    let kind = story
        .story_type
        .as_deref()
        .ok_or_else(|| GitStoryError::generation("response has no storyType"))?
        .parse::<StoryKind>()
        .map_err(GitStoryError::generation)?;

    let estimate = parse_points(story.estimated_points.as_ref())?;

    let labels: BTreeSet<String> = story
        .suggested_labels
        .iter()
        .map(|label| label.trim().to_lowercase())
        .filter(|label| !label.is_empty())
        .collect();

    let confidence = story
        .confidence
        .filter(|c| c.is_finite())
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    Ok(WorkItemDraft {
        title,
        description,
        kind,
        estimate,
        labels,
        confidence,
        provenance: Provenance::Generated {
            model: model.to_string(),
        },
    })
}

fn parse_points(value: Option<&Value>) -> Result<StoryPoints> {
    let value = value.ok_or_else(|| GitStoryError::generation("response has no estimatedPoints"))?;

    let points = value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        })
        .ok_or_else(|| {
            GitStoryError::generation(format!("estimatedPoints {} is not a number", value))
        })?;

    StoryPoints::try_from(points).map_err(GitStoryError::generation)
}

/// Strip a Markdown code fence if the service wrapped its JSON in one
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommitInfo, FileDelta, FileStatus};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedGenerator {
        reply: Result<String>,
        calls: AtomicUsize,
    }

    impl FixedGenerator {
        fn ok(text: &str) -> Self {
            FixedGenerator {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(msg: &str) -> Self {
            FixedGenerator {
                reply: Err(GitStoryError::generation(msg)),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        fn model(&self) -> &str {
            "test-model"
        }

        async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
            assert_eq!(system, prompt::SYSTEM_PROMPT);
            assert!(prompt.contains("Branch: add-login-page"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(GitStoryError::generation(e.to_string())),
            }
        }
    }

    fn change_set() -> ChangeSet {
        ChangeSet::new(
            "add-login-page",
            vec![CommitInfo::new("1234567abc", "feat: login", "Dev", Utc::now())],
            vec![FileDelta {
                path: "src/Login.tsx".to_string(),
                insertions: 20,
                deletions: 0,
                status: FileStatus::Added,
            }],
            "+<Login />",
        )
        .unwrap()
    }

    const VALID: &str = r#"{
        "title": "Add login page",
        "description": "Adds a login form.",
        "storyType": "feature",
        "estimatedPoints": 3,
        "suggestedLabels": ["Frontend", " auth ", "frontend", ""],
        "confidence": 0.85
    }"#;

    #[test]
    fn test_parse_valid_response() {
        let draft = parse_draft(VALID, "m").unwrap();
        assert_eq!(draft.title, "Add login page");
        assert_eq!(draft.kind, StoryKind::Feature);
        assert_eq!(draft.estimate, StoryPoints::THREE);
        assert_eq!(
            draft.labels.iter().cloned().collect::<Vec<_>>(),
            vec!["auth", "frontend"]
        );
        assert_eq!(draft.confidence, 0.85);
        assert_eq!(
            draft.provenance,
            Provenance::Generated {
                model: "m".to_string()
            }
        );
    }

    #[test]
    fn test_parse_fenced_response() {
        let fenced = format!("```json\n{}\n```", VALID);
        assert_eq!(parse_draft(&fenced, "m").unwrap().title, "Add login page");

        let bare_fence = format!("```\n{}\n```", VALID);
        assert!(parse_draft(&bare_fence, "m").is_ok());
    }

    #[test]
    fn test_confidence_defaults_and_clamps() {
        let missing = r#"{"title":"t","description":"d","storyType":"bug","estimatedPoints":1}"#;
        assert_eq!(parse_draft(missing, "m").unwrap().confidence, DEFAULT_CONFIDENCE);

        let high = r#"{"title":"t","description":"d","storyType":"bug","estimatedPoints":1,"confidence":7}"#;
        assert_eq!(parse_draft(high, "m").unwrap().confidence, 1.0);

        let low = r#"{"title":"t","description":"d","storyType":"bug","estimatedPoints":1,"confidence":-2}"#;
        assert_eq!(parse_draft(low, "m").unwrap().confidence, 0.0);
    }

    #[test]
    fn test_integral_float_points_accepted() {
        let text = r#"{"title":"t","description":"d","storyType":"chore","estimatedPoints":5.0}"#;
        assert_eq!(parse_draft(text, "m").unwrap().estimate, StoryPoints::FIVE);
    }

    #[test]
    fn test_invalid_responses_rejected() {
        let cases = [
            "not json",
            r#"{"description":"d","storyType":"bug","estimatedPoints":1}"#,
            r#"{"title":"  ","description":"d","storyType":"bug","estimatedPoints":1}"#,
            r#"{"title":"t","storyType":"bug","estimatedPoints":1}"#,
            r#"{"title":"t","description":"d","storyType":"epic","estimatedPoints":1}"#,
            r#"{"title":"t","description":"d","storyType":"bug","estimatedPoints":4}"#,
            r#"{"title":"t","description":"d","storyType":"bug","estimatedPoints":2.5}"#,
            r#"{"title":"t","description":"d","storyType":"bug","estimatedPoints":"three"}"#,
            r#"{"title":"t","description":"d","storyType":"bug"}"#,
        ];
        for text in cases {
            let err = parse_draft(text, "m").unwrap_err();
            assert!(matches!(err, GitStoryError::Generation(_)), "{}", text);
        }
    }

    #[test]
    fn test_long_title_truncated() {
        let text = format!(
            r#"{{"title":"{}","description":"d","storyType":"bug","estimatedPoints":1}}"#,
            "x".repeat(250)
        );
        assert_eq!(parse_draft(&text, "m").unwrap().title.chars().count(), 100);
    }

    #[tokio::test]
    async fn test_synthesize_uses_generated_draft() {
        let generator = Arc::new(FixedGenerator::ok(VALID));
        let synth = Synthesizer::new(Some(generator.clone()));

        let draft = synth.synthesize(&change_set()).await;
        assert!(!draft.is_fallback());
        assert_eq!(draft.title, "Add login page");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_synthesize_falls_back_on_failure() {
        let synth = Synthesizer::new(Some(Arc::new(FixedGenerator::failing("unreachable"))));

        let draft = synth.synthesize(&change_set()).await;
        assert_eq!(draft.confidence, fallback::FALLBACK_CONFIDENCE);
        match draft.provenance {
            Provenance::Fallback { reason } => assert!(reason.contains("unreachable")),
            other => panic!("unexpected provenance {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_synthesize_falls_back_on_malformed_response() {
        let synth = Synthesizer::new(Some(Arc::new(FixedGenerator::ok("I think it's a feature"))));
        let draft = synth.synthesize(&change_set()).await;
        assert!(draft.is_fallback());
        assert_eq!(draft.title, "Changes from branch add-login-page");
    }

    #[tokio::test]
    async fn test_offline_synthesizer() {
        let draft = Synthesizer::offline().synthesize(&change_set()).await;
        assert_eq!(
            draft.provenance,
            Provenance::Fallback {
                reason: "no generation service configured".to_string()
            }
        );
        assert!(draft.labels.contains("frontend"));
    }
}
