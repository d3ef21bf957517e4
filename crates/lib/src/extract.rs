//! # SQL Extraction
//!
//! Isolates a single SQL statement from the free-form text returned by the model.
//! Different prompt styles elicit different response shapes, so the strategy is
//! selected with an [`ExtractionMode`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// How a statement is pulled out of a model response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Take the first `SELECT ... ;` span, falling back to the trimmed response.
    #[default]
    Statement,
    /// Strip ```` ```sql ```` fences and surrounding whitespace.
    CodeFence,
}

impl std::str::FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "statement" => Ok(Self::Statement),
            "code_fence" | "codefence" | "fence" => Ok(Self::CodeFence),
            other => Err(format!(
                "unknown extraction mode '{other}', expected 'statement' or 'code_fence'"
            )),
        }
    }
}

fn select_statement_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)\bSELECT\s.*?;").expect("static regex is valid"))
}

fn code_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)```(?:sql)?").expect("static regex is valid"))
}

/// Extracts a candidate SQL statement from a model response.
///
/// Returns `None` when nothing is left after extraction, which callers treat as
/// "no SQL produced".
pub fn extract_sql(response: &str, mode: ExtractionMode) -> Option<String> {
    let sql = match mode {
        ExtractionMode::Statement => extract_statement(response),
        ExtractionMode::CodeFence => strip_code_fences(response),
    };

    if sql.is_empty() {
        None
    } else {
        Some(sql)
    }
}

/// Returns the first `SELECT ... ;` span, semicolon included, or the trimmed text.
pub fn extract_statement(response: &str) -> String {
    match select_statement_re().find(response) {
        Some(m) => m.as_str().to_string(),
        None => response.trim().to_string(),
    }
}

/// Removes every code-fence marker and trims the remainder.
pub fn strip_code_fences(response: &str) -> String {
    code_fence_re()
        .replace_all(response.trim(), "")
        .trim()
        .to_string()
}
