//! # Configuration Tests
//!
//! Layering of the server configuration: built-in defaults, the YAML file with
//! `${VAR}` substitution, and environment overrides. Every test touches process
//! environment variables, so they run serially.

use medquery::{extract::ExtractionMode, prompts::tasks::QUERY_SYSTEM_PROMPT};
use medquery_server::config::{get_config, ConfigError, QUERY_GENERATION_TASK};
use serial_test::serial;
use std::{env, fs, path::PathBuf};
use tempfile::{tempdir, TempDir};

const MINIMAL_CONFIG: &str = r#"
providers:
  local_default:
    provider: "local"
    api_url: "${TEST_LOCAL_AI_URL}"
    model_name: "qwen2.5:1.5b"
"#;

/// A helper function to clear all environment variables read by `get_config`.
fn clear_env_vars() {
    for var in [
        "PORT",
        "DB_URL",
        "API_TOKEN",
        "MAX_ROWS",
        "TEST_LOCAL_AI_URL",
        "MEDQUERY_POOL__MAX_CONNECTIONS",
        "MEDQUERY_EXTRACTION_MODE",
        "MEDQUERY_TASKS__QUERY_GENERATION__USER_PROMPT",
    ] {
        env::remove_var(var);
    }
}

fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
#[serial]
fn test_defaults_fill_missing_keys() {
    clear_env_vars();
    let (_dir, path) = write_config(MINIMAL_CONFIG);

    let config = get_config(path.to_str()).expect("Configuration should load successfully");

    assert_eq!(config.port, 8000);
    assert_eq!(config.db_url, "db/medical.db");
    assert_eq!(config.api_token(), None);
    assert_eq!(config.max_rows, 200);
    assert_eq!(config.extraction_mode, ExtractionMode::CodeFence);
    assert!(config.validate_literals);
    assert_eq!(config.model_timeout_secs, 60);
    assert_eq!(config.query_timeout_secs, 30);
    assert_eq!(config.pool.min_connections, 1);
    assert_eq!(config.pool.max_connections, 10);
    assert!(config.schema.is_none());

    let task = &config.tasks[QUERY_GENERATION_TASK];
    assert_eq!(task.provider.as_deref(), Some("local_default"));
    assert_eq!(task.system_prompt.as_deref(), Some(QUERY_SYSTEM_PROMPT));
    assert!(task.user_prompt.is_none());
}

#[test]
#[serial]
fn test_placeholders_are_substituted_from_env() {
    clear_env_vars();
    env::set_var("TEST_LOCAL_AI_URL", "http://localhost:1234/v1/chat/completions");
    let (_dir, path) = write_config(MINIMAL_CONFIG);

    let config = get_config(path.to_str()).unwrap();

    let provider = &config.providers["local_default"];
    assert_eq!(
        provider.api_url.as_deref(),
        Some("http://localhost:1234/v1/chat/completions")
    );
    assert_eq!(provider.model_name, "qwen2.5:1.5b");
    clear_env_vars();
}

#[test]
#[serial]
fn test_unset_placeholder_becomes_empty() {
    clear_env_vars();
    let (_dir, path) = write_config(
        r#"
api_token: "${API_TOKEN}"
providers: {}
"#,
    );

    let config = get_config(path.to_str()).unwrap();
    assert_eq!(config.api_token.as_deref(), Some(""));
    assert_eq!(config.api_token(), None);
}

#[test]
#[serial]
fn test_file_values_and_env_overrides() {
    clear_env_vars();
    let (_dir, path) = write_config(
        r#"
port: 9000
db_url: "data/file.db"
max_rows: 50
extraction_mode: "statement"
pool:
  min_connections: 2
  max_connections: 3
providers: {}
tasks:
  query_generation:
    provider: "gemini_default"
"#,
    );

    let from_file = get_config(path.to_str()).unwrap();
    assert_eq!(from_file.port, 9000);
    assert_eq!(from_file.db_url, "data/file.db");
    assert_eq!(from_file.max_rows, 50);
    assert_eq!(from_file.extraction_mode, ExtractionMode::Statement);
    assert_eq!(from_file.pool.min_connections, 2);
    assert_eq!(from_file.pool.max_connections, 3);
    // The file overrides the provider; the default system prompt survives the merge.
    let task = &from_file.tasks[QUERY_GENERATION_TASK];
    assert_eq!(task.provider.as_deref(), Some("gemini_default"));
    assert_eq!(task.system_prompt.as_deref(), Some(QUERY_SYSTEM_PROMPT));

    env::set_var("PORT", "9999");
    env::set_var("DB_URL", "env/other.db");
    env::set_var("API_TOKEN", "secret");
    env::set_var("MAX_ROWS", "25");
    env::set_var("MEDQUERY_POOL__MAX_CONNECTIONS", "7");
    env::set_var("MEDQUERY_EXTRACTION_MODE", "code_fence");
    env::set_var(
        "MEDQUERY_TASKS__QUERY_GENERATION__USER_PROMPT",
        "{schema}\nQuestion: {question}",
    );

    let from_env = get_config(path.to_str()).unwrap();
    assert_eq!(from_env.port, 9999);
    assert_eq!(from_env.db_url, "env/other.db");
    assert_eq!(from_env.api_token(), Some("secret"));
    assert_eq!(from_env.max_rows, 25);
    assert_eq!(from_env.pool.min_connections, 2);
    assert_eq!(from_env.pool.max_connections, 7);
    assert_eq!(from_env.extraction_mode, ExtractionMode::CodeFence);
    assert_eq!(
        from_env.tasks[QUERY_GENERATION_TASK].user_prompt.as_deref(),
        Some("{schema}\nQuestion: {question}")
    );

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_config_file_is_not_found() {
    clear_env_vars();
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.yml");

    match get_config(missing.to_str()) {
        Err(ConfigError::NotFound(msg)) => assert!(msg.contains("absent.yml"), "{msg}"),
        other => panic!("Expected NotFound, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_shipped_config_loads() {
    clear_env_vars();

    let config = get_config(None).expect("config.yml should parse");
    assert_eq!(config.port, 8000);
    assert!(config.providers.contains_key("local_default"));
    assert!(config.providers.contains_key("gemini_default"));
    assert_eq!(
        config.tasks[QUERY_GENERATION_TASK].provider.as_deref(),
        Some("local_default")
    );
}
