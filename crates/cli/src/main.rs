//! # medquery-cli: An interactive shell for `medquery`
//!
//! Reads questions from standard input and prints the answer for each one.
//! Logs go to `medquery-cli.log` so they do not interleave with the conversation.

mod repl;

use anyhow::Result;
use clap::Parser;
use medquery::{
    constants,
    extract::ExtractionMode,
    providers::{
        db::{pool::PoolOptions, sqlite::SqliteProvider},
        factory::create_ai_provider,
    },
    types::ProviderConfig,
    PromptClientBuilder,
};
use std::{fs::File, path::Path};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The path to the SQLite database file
    #[arg(long, env = "DB_URL", default_value = constants::DEFAULT_DB_FILE)]
    db_url: String,
    /// The AI provider type ("local" or "gemini")
    #[arg(long, env = "AI_PROVIDER", default_value = "local")]
    provider: String,
    /// The model endpoint. Derived from the model name for gemini
    #[arg(long, env = "AI_API_URL")]
    api_url: Option<String>,
    #[arg(long, env = "AI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "AI_MODEL", default_value = "qwen2.5:1.5b")]
    model: String,
    /// Row cap appended to statements without a LIMIT
    #[arg(long, env = "MAX_ROWS", default_value_t = constants::DEFAULT_MAX_ROWS)]
    max_rows: u32,
    /// How SQL is extracted from the model's answer ("statement" or "code_fence")
    #[arg(long, default_value = "statement")]
    mode: ExtractionMode,
    /// Skip the literal casing repair before execution
    #[arg(long)]
    no_validate: bool,
    /// Where logs are written
    #[arg(long, default_value = "medquery-cli.log")]
    log_file: String,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_file = File::create(&cli.log_file)?;
    let subscriber = fmt::Subscriber::builder()
        .with_writer(log_file)
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let provider_config = ProviderConfig {
        provider: cli.provider.clone(),
        api_url: cli.api_url.clone(),
        api_key: cli.api_key.clone(),
        model_name: cli.model.clone(),
    };
    let ai_provider = create_ai_provider("cli", &provider_config)?;

    if let Some(parent) = Path::new(&cli.db_url).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let storage = SqliteProvider::with_pool_options(&cli.db_url, PoolOptions::single()).await?;
    storage.initialize_schema().await?;

    let client = PromptClientBuilder::new()
        .ai_provider(ai_provider)
        .storage_provider(Box::new(storage))
        .extraction_mode(cli.mode)
        .validate_literals(!cli.no_validate)
        .max_rows(cli.max_rows)
        .build()?;
    info!(provider = %cli.provider, db_url = %cli.db_url, "CLI ready.");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    repl::run(&client, stdin, std::io::stdout()).await
}
