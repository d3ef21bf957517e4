//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds the configuration, the
//! pooled database provider and the `PromptClient` that answers questions,
//! making them accessible to all request handlers.

use crate::config::{AppConfig, QUERY_GENERATION_TASK};
use medquery::{
    prompts::{schema::MEDICAL_SCHEMA, tasks::QUERY_SYSTEM_PROMPT},
    providers::{db::sqlite::SqliteProvider, factory::create_ai_provider},
    PipelineSettings, PromptClient, PromptClientBuilder,
};
use std::{path::Path, sync::Arc, time::Duration};
use tracing::{info, warn};

/// The shared application state, accessible from all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// The question-answering pipeline, bound to the configured model and database.
    pub prompt_client: Arc<PromptClient>,
    /// The pooled database provider, shared with `prompt_client`.
    pub sqlite_provider: Arc<SqliteProvider>,
}

/// Builds the shared application state from the configuration.
///
/// - Resolves the `query_generation` task and instantiates its AI provider.
/// - Opens the SQLite database with a connection pool and ensures the medical schema exists.
/// - Assembles the pipeline settings from the configuration.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let task = config
        .tasks
        .get(QUERY_GENERATION_TASK)
        .cloned()
        .unwrap_or_default();
    let provider_name = task.provider.clone().ok_or_else(|| {
        anyhow::anyhow!("Task '{QUERY_GENERATION_TASK}' is missing required 'provider' field")
    })?;
    let provider_config = config.providers.get(&provider_name).ok_or_else(|| {
        anyhow::anyhow!(
            "Task '{QUERY_GENERATION_TASK}' refers to unknown provider '{provider_name}'"
        )
    })?;
    let ai_provider = create_ai_provider(&provider_name, provider_config)?;
    info!(
        provider = %provider_name,
        model = %provider_config.model_name,
        "AI provider ready."
    );

    if let Some(parent) = Path::new(&config.db_url).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let sqlite_provider = SqliteProvider::with_pool_options(&config.db_url, config.pool).await?;
    sqlite_provider.initialize_schema().await?;
    info!(
        db_url = %config.db_url,
        max_connections = config.pool.max_connections,
        "Database ready."
    );

    let settings = PipelineSettings {
        extraction_mode: config.extraction_mode,
        validate_literals: config.validate_literals,
        max_rows: config.max_rows,
        model_timeout: Duration::from_secs(config.model_timeout_secs),
        query_timeout: Duration::from_secs(config.query_timeout_secs),
        schema: config
            .schema
            .clone()
            .unwrap_or_else(|| MEDICAL_SCHEMA.to_string()),
        system_prompt: task
            .system_prompt
            .unwrap_or_else(|| QUERY_SYSTEM_PROMPT.to_string()),
        user_prompt_template: task.user_prompt,
    };

    let prompt_client = PromptClientBuilder::new()
        .ai_provider(ai_provider)
        .storage_provider(Box::new(sqlite_provider.clone()))
        .settings(settings)
        .build()?;

    if config.api_token().is_none() {
        warn!("No api_token configured; every route is served without authentication.");
    }

    Ok(AppState {
        config: Arc::new(config),
        prompt_client: Arc::new(prompt_client),
        sqlite_provider: Arc::new(sqlite_provider),
    })
}
