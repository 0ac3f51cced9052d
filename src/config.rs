use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GitStoryError, Result};

/// File name looked up in the current directory
pub const LOCAL_CONFIG_FILE: &str = ".git-story.toml";

/// Represents the complete configuration for git-story.
///
/// Written by the setup wizard, loaded once per invocation and handed to the
/// pipeline by value.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_base_branch")]
    pub base_branch: String,

    #[serde(default = "default_skip_branches")]
    pub skip_branches: Vec<String>,

    #[serde(default)]
    pub ai: AiConfig,

    pub tracker: TrackerConfig,
}

/// Returns the default base branch.
fn default_base_branch() -> String {
    "main".to_string()
}

/// Returns the default list of branches that never get a story.
fn default_skip_branches() -> Vec<String> {
    vec![
        "main".to_string(),
        "master".to_string(),
        "develop".to_string(),
    ]
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Settings for the text-generation service.
///
/// Without an API key the synthesizer goes straight to the rule-based draft.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AiConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
        }
    }
}

impl AiConfig {
    /// The API key, if one is set and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Which tracker to create work items in, selected by `type` in the file
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TrackerConfig {
    Shortcut(ShortcutConfig),
    Jira(JiraConfig),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ShortcutConfig {
    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub workflow_state_id: Option<u64>,

    /// Team the story is assigned to
    #[serde(default)]
    pub group_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct JiraConfig {
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub api_token: String,

    #[serde(default)]
    pub project_key: String,

    #[serde(default)]
    pub sprint_id: Option<u64>,

    /// Custom field holding story points, e.g. `customfield_10016`
    #[serde(default)]
    pub story_points_field: Option<String>,
}

impl TrackerConfig {
    /// Lowercase tracker name as written in the config file
    pub fn name(&self) -> &'static str {
        match self {
            TrackerConfig::Shortcut(_) => "shortcut",
            TrackerConfig::Jira(_) => "jira",
        }
    }

    /// Check that the selected variant carries every required field.
    pub fn validate(&self) -> Result<()> {
        let missing = match self {
            TrackerConfig::Shortcut(shortcut) => blank_fields(&[("token", &shortcut.token)]),
            TrackerConfig::Jira(jira) => blank_fields(&[
                ("base_url", &jira.base_url),
                ("email", &jira.email),
                ("api_token", &jira.api_token),
                ("project_key", &jira.project_key),
            ]),
        };

        if missing.is_empty() {
            Ok(())
        } else {
            Err(GitStoryError::config(format!(
                "{} tracker is missing required field(s): {}",
                self.name(),
                missing.join(", ")
            )))
        }
    }
}

impl Config {
    /// Parse a configuration document without validating it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Fill blank secrets from the environment.
    ///
    /// `OPENAI_API_KEY`, `SHORTCUT_API_TOKEN` and `JIRA_API_TOKEN` only apply
    /// when the file leaves the corresponding field empty.
    pub fn apply_env_overrides(&mut self) {
        if self.ai.api_key().is_none() {
            if let Some(key) = env_value("OPENAI_API_KEY") {
                self.ai.api_key = Some(key);
            }
        }

        match &mut self.tracker {
            TrackerConfig::Shortcut(shortcut) => {
                if shortcut.token.trim().is_empty() {
                    if let Some(token) = env_value("SHORTCUT_API_TOKEN") {
                        shortcut.token = token;
                    }
                }
            }
            TrackerConfig::Jira(jira) => {
                if jira.api_token.trim().is_empty() {
                    if let Some(token) = env_value("JIRA_API_TOKEN") {
                        jira.api_token = token;
                    }
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_branch.trim().is_empty() {
            return Err(GitStoryError::config("base_branch must not be empty"));
        }
        self.tracker.validate()
    }
}

fn blank_fields(fields: &[(&'static str, &String)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| *field)
        .collect()
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Path of the per-user configuration file, if the platform has a config dir
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("git-story").join("config.toml"))
}

/// Locate the configuration file.
///
/// Order:
/// 1. Custom path provided as parameter
/// 2. `.git-story.toml` in current directory
/// 3. `git-story/config.toml` in user config directory
pub fn find_config(config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        return Ok(path.to_path_buf());
    }

    let local = Path::new(".").join(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Ok(local);
    }

    match user_config_path() {
        Some(path) if path.exists() => Ok(path),
        _ => Err(GitStoryError::config(format!(
            "no configuration found; create {} or run the setup wizard",
            LOCAL_CONFIG_FILE
        ))),
    }
}

/// Loads, completes and validates the configuration.
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Configuration ready to be injected into the pipeline
/// * `Err` - If no file exists, it cannot be read or parsed, or required
///   tracker fields are missing
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let path = find_config(config_path)?;
    let content = fs::read_to_string(&path).map_err(|e| {
        GitStoryError::config(format!("cannot read {}: {}", path.display(), e))
    })?;

    let mut config = Config::from_toml_str(&content)?;
    config.apply_env_overrides();
    config.validate()?;

    tracing::debug!(
        path = %path.display(),
        tracker = config.tracker.name(),
        base = %config.base_branch,
        "Loaded configuration"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_toml_str(
            r#"
[tracker]
type = "shortcut"
token = "abc"
"#,
        )
        .unwrap();

        assert_eq!(config.base_branch, "main");
        assert_eq!(config.skip_branches, vec!["main", "master", "develop"]);
        assert_eq!(config.ai.model, "gpt-4o-mini");
        assert_eq!(config.ai.endpoint, "https://api.openai.com/v1");
        assert!(config.ai.api_key().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_api_key_is_treated_as_absent() {
        let ai = AiConfig {
            api_key: Some("   ".to_string()),
            ..AiConfig::default()
        };
        assert!(ai.api_key().is_none());
    }

    #[test]
    fn test_jira_missing_fields_are_listed() {
        let config = Config::from_toml_str(
            r#"
[tracker]
type = "jira"
base_url = "https://acme.atlassian.net"
project_key = "PROJ"
"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, GitStoryError::Config(_)));
        let msg = err.to_string();
        assert!(msg.contains("email"), "{}", msg);
        assert!(msg.contains("api_token"), "{}", msg);
        assert!(!msg.contains("project_key"), "{}", msg);
    }

    #[test]
    fn test_unknown_tracker_type_is_config_error() {
        let err = Config::from_toml_str(
            r#"
[tracker]
type = "linear"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, GitStoryError::Config(_)));
    }

    #[test]
    fn test_missing_tracker_section_is_config_error() {
        let err = Config::from_toml_str("base_branch = \"main\"").unwrap_err();
        assert!(matches!(err, GitStoryError::Config(_)));
    }

    #[test]
    fn test_empty_base_branch_rejected() {
        let config = Config::from_toml_str(
            r#"
base_branch = ""
[tracker]
type = "shortcut"
token = "abc"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
