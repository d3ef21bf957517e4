use crate::{
    constants,
    errors::PromptError,
    extract::ExtractionMode,
    prompts::{schema::MEDICAL_SCHEMA, tasks::QUERY_SYSTEM_PROMPT},
    providers::{ai::AiProvider, db::storage::Storage},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

// --- Result Sets ---

/// The rows returned by one statement, with the column names from its descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Converts every row into a `{column: value}` JSON object.
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let record: Map<String, Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect();
                Value::Object(record)
            })
            .collect()
    }
}

/// A table known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

/// One column of a table description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub column: String,
    #[serde(rename = "type")]
    pub r#type: String,
}

// --- Generation ---

/// Why a question did not produce a SQL statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum GenerationFailure {
    /// The question was empty after trimming.
    EmptyQuestion,
    /// The model could not be reached or answered with an error.
    ModelUnavailable(String),
    /// The model did not answer within the configured timeout.
    Timeout(Duration),
    /// The model answered, but nothing usable could be extracted.
    NoSql,
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationFailure::EmptyQuestion => write!(f, "{}", constants::EMPTY_QUESTION),
            GenerationFailure::ModelUnavailable(detail) => {
                write!(f, "Could not generate SQL: {detail}")
            }
            GenerationFailure::Timeout(timeout) => write!(
                f,
                "Could not generate SQL: the model did not answer within {}.",
                crate::format::describe_duration(timeout)
            ),
            GenerationFailure::NoSql => write!(f, "{}", constants::NO_SQL_PRODUCED),
        }
    }
}

/// The tagged result of the query-generation stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Sql(String),
    Failed(GenerationFailure),
}

// --- Answers ---

/// How a question-answering call ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum AskOutcome {
    /// The statement ran and returned at least one row.
    Answered,
    /// The statement ran and legitimately returned nothing.
    NoRecords,
    GenerationFailed(GenerationFailure),
    /// The store rejected the statement, or it timed out.
    ExecutionFailed(String),
}

/// Everything produced by one question-answering call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskResponse {
    pub question: String,
    /// The statement that was executed (after validation and row limiting), if any.
    pub sql: Option<String>,
    pub result: QueryResult,
    pub outcome: AskOutcome,
}

impl AskResponse {
    pub(crate) fn generation_failed(question: &str, failure: GenerationFailure) -> Self {
        Self {
            question: question.to_string(),
            sql: None,
            result: QueryResult::default(),
            outcome: AskOutcome::GenerationFailed(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AskOutcome::Answered | AskOutcome::NoRecords)
    }

    /// The human-readable answer for this call.
    pub fn answer_text(&self) -> String {
        match &self.outcome {
            AskOutcome::Answered | AskOutcome::NoRecords => crate::format::format_result(&self.result),
            AskOutcome::GenerationFailed(failure) => failure.to_string(),
            AskOutcome::ExecutionFailed(detail) => format!("SQL execution error: {detail}"),
        }
    }
}

/// Per-call overrides of the pipeline settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskOptions {
    pub question: String,
    #[serde(default)]
    pub extraction_mode: Option<ExtractionMode>,
    #[serde(default)]
    pub validate_literals: Option<bool>,
    #[serde(default)]
    pub max_rows: Option<u32>,
}

impl AskOptions {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }
}

// --- Client Configuration ---

/// A reusable configuration for a specific AI provider instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The type of provider ("local" or "gemini").
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    /// The API key, which can be null for local providers.
    #[serde(default)]
    pub api_key: Option<String>,
    pub model_name: String,
}

/// Settings that shape every run of the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub extraction_mode: ExtractionMode,
    pub validate_literals: bool,
    pub max_rows: u32,
    pub model_timeout: Duration,
    pub query_timeout: Duration,
    pub schema: String,
    pub system_prompt: String,
    /// Instruction template; `None` selects the default for the extraction mode.
    pub user_prompt_template: Option<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            extraction_mode: ExtractionMode::Statement,
            validate_literals: true,
            max_rows: constants::DEFAULT_MAX_ROWS,
            model_timeout: Duration::from_secs(constants::DEFAULT_MODEL_TIMEOUT_SECS),
            query_timeout: Duration::from_secs(constants::DEFAULT_QUERY_TIMEOUT_SECS),
            schema: MEDICAL_SCHEMA.to_string(),
            system_prompt: QUERY_SYSTEM_PROMPT.to_string(),
            user_prompt_template: None,
        }
    }
}

/// A client that answers natural-language questions against a relational store.
#[derive(Clone)]
pub struct PromptClient {
    pub ai_provider: Box<dyn AiProvider>,
    pub storage_provider: Box<dyn Storage>,
    pub settings: PipelineSettings,
}

impl fmt::Debug for PromptClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptClient")
            .field("ai_provider", &self.ai_provider)
            .field("storage_provider", &self.storage_provider)
            .field("extraction_mode", &self.settings.extraction_mode)
            .field("validate_literals", &self.settings.validate_literals)
            .finish_non_exhaustive()
    }
}

/// A builder for creating `PromptClient` instances.
///
/// # Examples
///
/// ```no_run
/// use medquery::{providers::{ai::local::LocalAiProvider, db::sqlite::SqliteProvider}, PromptClientBuilder};
///
/// # async fn run() -> Result<(), medquery::PromptError> {
/// let ai = LocalAiProvider::new("http://localhost:11434/v1/chat/completions".into(), None, Some("qwen2.5:1.5b".into()))?;
/// let db = SqliteProvider::new("db/medical.db").await?;
/// let client = PromptClientBuilder::new()
///     .ai_provider(Box::new(ai))
///     .storage_provider(Box::new(db))
///     .build()?;
/// let answer = client.ask("How many female patients have diabetes?").await;
/// println!("{}", answer.answer_text());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct PromptClientBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    storage_provider: Option<Box<dyn Storage>>,
    settings: PipelineSettings,
}

impl PromptClientBuilder {
    /// Creates a new `PromptClientBuilder` with default pipeline settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the AI provider.
    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    /// Sets the storage provider.
    pub fn storage_provider(mut self, storage_provider: Box<dyn Storage>) -> Self {
        self.storage_provider = Some(storage_provider);
        self
    }

    /// Replaces all pipeline settings at once.
    pub fn settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn extraction_mode(mut self, mode: ExtractionMode) -> Self {
        self.settings.extraction_mode = mode;
        self
    }

    pub fn validate_literals(mut self, enabled: bool) -> Self {
        self.settings.validate_literals = enabled;
        self
    }

    pub fn max_rows(mut self, max_rows: u32) -> Self {
        self.settings.max_rows = max_rows;
        self
    }

    pub fn model_timeout(mut self, timeout: Duration) -> Self {
        self.settings.model_timeout = timeout;
        self
    }

    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.settings.query_timeout = timeout;
        self
    }

    /// Builds the `PromptClient`.
    ///
    /// Fails when either provider is missing.
    pub fn build(self) -> Result<PromptClient, PromptError> {
        let ai_provider = self
            .ai_provider
            .ok_or_else(|| PromptError::MissingAiProvider("no AI provider was set".to_string()))?;
        let storage_provider = self
            .storage_provider
            .ok_or(PromptError::MissingStorageProvider)?;

        Ok(PromptClient {
            ai_provider,
            storage_provider,
            settings: self.settings,
        })
    }
}
