//! # Prompt Templates
//!
//! This module organizes the prompt templates used by the query-generation stage and
//! the function that turns a template, the schema and a question into the final
//! instruction sent to the model.

pub mod schema;
pub mod tasks;

use crate::extract::ExtractionMode;

/// Returns the default instruction template for an extraction mode.
///
/// Each mode has a prompt style that tends to elicit the response shape the
/// extractor expects (a terminated statement, or a fenced code block).
pub fn default_user_prompt(mode: ExtractionMode) -> &'static str {
    match mode {
        ExtractionMode::Statement => tasks::STATEMENT_USER_PROMPT,
        ExtractionMode::CodeFence => tasks::CODE_FENCE_USER_PROMPT,
    }
}

/// Renders the system prompt for the given SQL dialect.
pub fn build_system_prompt(template: &str, dialect: &str) -> String {
    template.replace("{dialect}", dialect)
}

/// Builds the single instruction string for the model.
///
/// The question is embedded verbatim. It is substituted last so that braces typed by
/// the user are never mistaken for template placeholders.
pub fn build_query_prompt(template: &str, schema: &str, dialect: &str, question: &str) -> String {
    template
        .replace("{schema}", schema)
        .replace("{dialect}", dialect)
        .replace("{question}", question)
}
