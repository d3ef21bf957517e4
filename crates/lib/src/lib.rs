//! # Natural Language to SQL over Medical Records
//!
//! This crate turns a free-text question about patients, diseases, medicines, doctors
//! and appointments into one SQL statement using a configurable AI provider, repairs
//! the casing of well-known literals, runs the statement with a row cap against a
//! storage provider, and renders the rows as a short textual answer.
//!
//! The stages are exposed individually (`prompts`, `extract`, `validate`, `executor`,
//! `format`) and composed by [`PromptClient::ask`].

pub mod constants;
pub mod errors;
pub mod executor;
pub mod extract;
pub mod format;
pub mod prompts;
pub mod providers;
pub mod types;
pub mod validate;

pub use errors::PromptError;
pub use extract::ExtractionMode;
pub use types::{
    AskOptions, AskOutcome, AskResponse, Generation, GenerationFailure, PipelineSettings,
    PromptClient, PromptClientBuilder, QueryResult,
};

use tracing::{debug, error, info, warn};

impl PromptClient {
    /// Converts a question into a single SQL statement using the configured extraction mode.
    pub async fn generate_sql(&self, question: &str) -> Generation {
        self.generate_sql_with_mode(question, self.settings.extraction_mode)
            .await
    }

    /// Converts a question into a single SQL statement.
    ///
    /// Builds the prompts, calls the AI provider under the model timeout and extracts
    /// the statement from its answer. Every failure is returned as a tagged
    /// [`GenerationFailure`]; nothing is retried.
    pub async fn generate_sql_with_mode(&self, question: &str, mode: ExtractionMode) -> Generation {
        let question = question.trim();
        if question.is_empty() {
            return Generation::Failed(GenerationFailure::EmptyQuestion);
        }

        let dialect = self.storage_provider.dialect();
        let template = self
            .settings
            .user_prompt_template
            .as_deref()
            .unwrap_or_else(|| prompts::default_user_prompt(mode));
        let system_prompt = prompts::build_system_prompt(&self.settings.system_prompt, dialect);
        let user_prompt =
            prompts::build_query_prompt(template, &self.settings.schema, dialect, question);

        debug!(system_prompt = %system_prompt, user_prompt = %user_prompt, "--> Sending prompts to AI Provider");

        let timeout = self.settings.model_timeout;
        let raw_response = match tokio::time::timeout(
            timeout,
            self.ai_provider.generate(&system_prompt, &user_prompt),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!("[generate_sql] AI provider error: {e}");
                return Generation::Failed(GenerationFailure::ModelUnavailable(e.to_string()));
            }
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "[generate_sql] AI provider timed out."
                );
                return Generation::Failed(GenerationFailure::Timeout(timeout));
            }
        };

        debug!("<-- Response from AI: {}", &raw_response);

        match extract::extract_sql(&raw_response, mode) {
            Some(sql) => {
                info!(sql = %sql, "[generate_sql] Extracted statement.");
                Generation::Sql(sql)
            }
            None => {
                warn!("[generate_sql] AI response contained no usable SQL.");
                Generation::Failed(GenerationFailure::NoSql)
            }
        }
    }

    /// Answers a question using the client's settings.
    pub async fn ask(&self, question: &str) -> AskResponse {
        self.ask_with_options(AskOptions::new(question)).await
    }

    /// Answers a question, overriding settings for this call only.
    ///
    /// This never fails: generation and execution problems are reported through
    /// [`AskResponse::outcome`], and an empty result is a successful
    /// [`AskOutcome::NoRecords`].
    pub async fn ask_with_options(&self, options: AskOptions) -> AskResponse {
        let question = options.question.trim().to_string();
        info!("[ask] received question: {:?}", question);

        let mode = options
            .extraction_mode
            .unwrap_or(self.settings.extraction_mode);
        let check_literals = options
            .validate_literals
            .unwrap_or(self.settings.validate_literals);
        let max_rows = options.max_rows.unwrap_or(self.settings.max_rows);

        let sql = match self.generate_sql_with_mode(&question, mode).await {
            Generation::Sql(sql) => sql,
            Generation::Failed(failure) => {
                return AskResponse::generation_failed(&question, failure);
            }
        };

        let sql = if check_literals {
            validate::validate_literals(&*self.storage_provider, &sql).await
        } else {
            sql
        };
        let sql = executor::apply_row_limit(&sql, max_rows);

        let (result, outcome) = match executor::execute_with_limit(
            &*self.storage_provider,
            &sql,
            max_rows,
            self.settings.query_timeout,
        )
        .await
        {
            Ok(result) if result.is_empty() => (result, AskOutcome::NoRecords),
            Ok(result) => (result, AskOutcome::Answered),
            Err(e) => {
                error!("[ask] Query execution error: {e}");
                (QueryResult::default(), AskOutcome::ExecutionFailed(e.to_string()))
            }
        };

        info!(rows = result.rows.len(), outcome = ?outcome, "[ask] finished.");

        AskResponse {
            question,
            sql: Some(sql),
            result,
            outcome,
        }
    }
}
