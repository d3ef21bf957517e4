//! # Application Configuration
//!
//! This module defines the configuration structure for the `medquery-server` and
//! provides the logic for loading it from a `config.yml` file and environment
//! variables.

use config::{
    Config as ConfigBuilder, Environment, File, FileFormat, Value as ConfigValue,
    ValueKind as ConfigValueKind,
};
use medquery::{
    constants,
    extract::ExtractionMode,
    providers::db::pool::PoolOptions,
    prompts::tasks::QUERY_SYSTEM_PROMPT,
    types::ProviderConfig,
};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use tracing::info;

/// The name of the task that turns questions into SQL.
pub const QUERY_GENERATION_TASK: &str = "query_generation";

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The path to the SQLite database file. Loaded from `DB_URL` env var.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// The bearer token protecting every route except `/` and `/health`.
    /// Loaded from `API_TOKEN` env var. Empty or absent disables the check.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Row cap for statements without a `LIMIT`. Loaded from `MAX_ROWS` env var.
    #[serde(default = "default_max_rows")]
    pub max_rows: u32,
    #[serde(default = "default_extraction_mode")]
    pub extraction_mode: ExtractionMode,
    #[serde(default = "default_validate_literals")]
    pub validate_literals: bool,
    #[serde(default = "default_model_timeout_secs")]
    pub model_timeout_secs: u64,
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
    #[serde(default)]
    pub pool: PoolOptions,
    /// Replaces the built-in schema description placed in every prompt.
    #[serde(default)]
    pub schema: Option<String>,

    /// A map of named, reusable AI provider configurations.
    pub providers: HashMap<String, ProviderConfig>,
    /// A map of tasks, each specifying a provider and prompts.
    pub tasks: HashMap<String, TaskConfig>,
}

impl AppConfig {
    /// The configured API token, if authentication is enabled.
    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref().filter(|token| !token.is_empty())
    }
}

fn default_port() -> u16 {
    8000
}

fn default_db_url() -> String {
    constants::DEFAULT_DB_FILE.to_string()
}

fn default_max_rows() -> u32 {
    constants::DEFAULT_MAX_ROWS
}

fn default_extraction_mode() -> ExtractionMode {
    ExtractionMode::CodeFence
}

fn default_validate_literals() -> bool {
    true
}

fn default_model_timeout_secs() -> u64 {
    constants::DEFAULT_MODEL_TIMEOUT_SECS
}

fn default_query_timeout_secs() -> u64 {
    constants::DEFAULT_QUERY_TIMEOUT_SECS
}

/// Defines the prompts and provider for a specific application task.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TaskConfig {
    /// The key of the provider to use from the `providers` map.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Instruction template. When absent, the default for `extraction_mode` is used.
    #[serde(default)]
    pub user_prompt: Option<String>,
}

/// Constructs a `config::Value` map of the default, hardcoded tasks from the library.
/// This serves as the base layer of configuration.
fn build_default_tasks() -> HashMap<String, ConfigValue> {
    let tasks = vec![(QUERY_GENERATION_TASK, ("local_default", QUERY_SYSTEM_PROMPT))];

    tasks
        .into_iter()
        .map(|(name, (provider, sys))| {
            let mut table = HashMap::new();
            table.insert("provider".to_string(), ConfigValue::from(provider));
            table.insert("system_prompt".to_string(), ConfigValue::from(sys));
            (
                name.to_string(),
                ConfigValue::new(None, ConfigValueKind::Table(table)),
            )
        })
        .collect()
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// Layers, lowest priority first:
/// 1. The library's default `query_generation` task.
/// 2. `config.yml` next to the crate manifest (or `config_path_override`), with `${VAR}` substitution.
/// 3. An optional `prompt.yml` next to the crate manifest, for prompt overrides.
/// 4. Top-level keys from plain environment variables (`PORT`, `DB_URL`, `API_TOKEN`, `MAX_ROWS`).
/// 5. Nested keys from `MEDQUERY_` variables (e.g., `MEDQUERY_POOL__MAX_CONNECTIONS`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults from the library.
        .set_default("tasks", build_default_tasks())?;

    // Layer 2: Main Config
    let main_config_path = match config_path_override {
        Some(override_path) => override_path.to_string(),
        None => format!("{base_path}/config.yml"),
    };
    info!("Loading configuration from '{main_config_path}'.");

    let main_content = read_and_substitute(&main_config_path)?.ok_or_else(|| {
        ConfigError::NotFound(format!(
            "Main config file not found at '{main_config_path}'. Please ensure 'config.yml' exists."
        ))
    })?;
    builder = builder.add_source(File::from_str(&main_content, FileFormat::Yaml));

    // Layer 3: User Prompt Overrides (Optional)
    let user_prompt_path = format!("{base_path}/prompt.yml");
    if let Some(user_prompts_content) = read_and_substitute(&user_prompt_path)? {
        info!("Loading user prompt overrides from '{user_prompt_path}'.");
        builder = builder.add_source(File::from_str(&user_prompts_content, FileFormat::Yaml));
    }

    let settings = builder
        // Layer 4: Load environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 5: Load prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("MEDQUERY")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    Ok(config)
}
