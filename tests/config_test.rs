// tests/config_test.rs
use git_story::config::{find_config, load_config, TrackerConfig};
use git_story::GitStoryError;
use serial_test::serial;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

const JIRA: &str = r#"
base_branch = "develop"
skip_branches = ["develop", "release"]

[ai]
api_key = "sk-file"
model = "gpt-4o"

[tracker]
type = "jira"
base_url = "https://acme.atlassian.net"
email = "dev@acme.io"
api_token = "file-token"
project_key = "PROJ"
sprint_id = 42
story_points_field = "customfield_10016"
"#;

#[test]
#[serial]
fn test_load_jira_config() {
    let file = config_file(JIRA);
    let config = load_config(Some(file.path())).unwrap();

    assert_eq!(config.base_branch, "develop");
    assert_eq!(config.skip_branches, vec!["develop", "release"]);
    assert_eq!(config.ai.api_key(), Some("sk-file"));
    assert_eq!(config.ai.model, "gpt-4o");
    assert_eq!(config.ai.endpoint, "https://api.openai.com/v1");

    match config.tracker {
        TrackerConfig::Jira(jira) => {
            assert_eq!(jira.base_url, "https://acme.atlassian.net");
            assert_eq!(jira.project_key, "PROJ");
            assert_eq!(jira.sprint_id, Some(42));
            assert_eq!(
                jira.story_points_field.as_deref(),
                Some("customfield_10016")
            );
        }
        other => panic!("expected jira tracker, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_load_shortcut_config() {
    let file = config_file(
        r#"
[tracker]
type = "shortcut"
token = "sc-token"
workflow_state_id = 500000011
group_id = "team-uuid"
"#,
    );
    let config = load_config(Some(file.path())).unwrap();

    assert_eq!(config.base_branch, "main");
    match config.tracker {
        TrackerConfig::Shortcut(shortcut) => {
            assert_eq!(shortcut.token, "sc-token");
            assert_eq!(shortcut.workflow_state_id, Some(500000011));
            assert_eq!(shortcut.group_id.as_deref(), Some("team-uuid"));
        }
        other => panic!("expected shortcut tracker, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_missing_required_field_is_config_error() {
    let file = config_file(
        r#"
[tracker]
type = "jira"
base_url = "https://acme.atlassian.net"
email = "dev@acme.io"
"#,
    );
    std::env::remove_var("JIRA_API_TOKEN");

    let err = load_config(Some(file.path())).unwrap_err();
    assert!(matches!(err, GitStoryError::Config(_)));
    let message = err.to_string();
    assert!(message.contains("api_token"), "got: {}", message);
    assert!(message.contains("project_key"), "got: {}", message);
}

#[test]
#[serial]
fn test_env_overrides_fill_blank_secrets() {
    let file = config_file(
        r#"
[tracker]
type = "jira"
base_url = "https://acme.atlassian.net"
email = "dev@acme.io"
project_key = "PROJ"
"#,
    );
    std::env::set_var("JIRA_API_TOKEN", "env-token");
    std::env::set_var("OPENAI_API_KEY", "sk-env");

    let result = load_config(Some(file.path()));

    std::env::remove_var("JIRA_API_TOKEN");
    std::env::remove_var("OPENAI_API_KEY");

    let config = result.unwrap();
    assert_eq!(config.ai.api_key(), Some("sk-env"));
    match config.tracker {
        TrackerConfig::Jira(jira) => assert_eq!(jira.api_token, "env-token"),
        other => panic!("expected jira tracker, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_env_does_not_replace_file_values() {
    let file = config_file(JIRA);
    std::env::set_var("JIRA_API_TOKEN", "env-token");
    std::env::set_var("OPENAI_API_KEY", "sk-env");

    let result = load_config(Some(file.path()));

    std::env::remove_var("JIRA_API_TOKEN");
    std::env::remove_var("OPENAI_API_KEY");

    let config = result.unwrap();
    assert_eq!(config.ai.api_key(), Some("sk-file"));
    match config.tracker {
        TrackerConfig::Jira(jira) => assert_eq!(jira.api_token, "file-token"),
        other => panic!("expected jira tracker, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_shortcut_token_from_env() {
    let file = config_file(
        r#"
[tracker]
type = "shortcut"
"#,
    );
    std::env::set_var("SHORTCUT_API_TOKEN", "env-sc");

    let result = load_config(Some(file.path()));
    std::env::remove_var("SHORTCUT_API_TOKEN");

    match result.unwrap().tracker {
        TrackerConfig::Shortcut(shortcut) => assert_eq!(shortcut.token, "env-sc"),
        other => panic!("expected shortcut tracker, got {:?}", other),
    }
}

#[test]
fn test_invalid_toml_is_config_error() {
    let file = config_file("base_branch = [unclosed");
    let err = load_config(Some(file.path())).unwrap_err();
    assert!(matches!(err, GitStoryError::Config(_)));
}

#[test]
fn test_explicit_missing_path_is_config_error() {
    let err = load_config(Some(Path::new("/nonexistent/git-story.toml"))).unwrap_err();
    assert!(matches!(err, GitStoryError::Config(_)));
}

#[test]
fn test_explicit_path_wins() {
    let path = Path::new("/somewhere/custom.toml");
    assert_eq!(find_config(Some(path)).unwrap(), path);
}
