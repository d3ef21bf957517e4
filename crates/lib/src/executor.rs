//! # The Query Executor
//!
//! This module runs a generated statement against a [`Storage`] provider. Every
//! statement is capped to a maximum number of rows and bounded by a timeout, so a
//! runaway query can neither flood the caller nor hold a pooled connection forever.

use crate::{errors::PromptError, providers::db::storage::Storage, types::QueryResult};
use regex::Regex;
use serde_json::Value;
use std::{sync::OnceLock, time::Duration};
use tracing::{debug, warn};

fn limit_clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bLIMIT\b").expect("static regex is valid"))
}

/// Appends ` LIMIT {max_rows}` unless the statement already contains a `LIMIT` keyword.
///
/// Trailing whitespace and semicolons are removed before the clause is appended.
/// A statement that already limits itself is returned unchanged, even when its
/// own limit is larger than `max_rows`.
pub fn apply_row_limit(sql: &str, max_rows: u32) -> String {
    if limit_clause_re().is_match(sql) {
        return sql.to_string();
    }
    let body = sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    format!("{body} LIMIT {max_rows}")
}

/// Applies the row limit and runs the statement, giving up after `timeout`.
pub async fn execute_with_limit(
    storage: &dyn Storage,
    sql: &str,
    max_rows: u32,
    timeout: Duration,
) -> Result<QueryResult, PromptError> {
    execute_with_params(storage, sql, Vec::new(), max_rows, timeout).await
}

/// Like [`execute_with_limit`], binding `params` to the statement's `?` placeholders.
pub async fn execute_with_params(
    storage: &dyn Storage,
    sql: &str,
    params: Vec<Value>,
    max_rows: u32,
    timeout: Duration,
) -> Result<QueryResult, PromptError> {
    let limited = apply_row_limit(sql, max_rows);
    debug!(sql = %limited, params = params.len(), timeout_ms = timeout.as_millis() as u64, "Executing limited statement.");

    match tokio::time::timeout(timeout, storage.execute_query_with_params(&limited, params)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(sql = %limited, "Statement exceeded the query timeout.");
            Err(PromptError::StorageTimeout(timeout))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_limit_and_drops_semicolon() {
        assert_eq!(
            apply_row_limit("SELECT * FROM patients;", 200),
            "SELECT * FROM patients LIMIT 200"
        );
        assert_eq!(
            apply_row_limit("  SELECT name FROM doctors ;\n", 5),
            "SELECT name FROM doctors LIMIT 5"
        );
    }

    #[test]
    fn keeps_existing_limit() {
        let sql = "SELECT * FROM patients limit 500;";
        assert_eq!(apply_row_limit(sql, 200), sql);
    }

    #[test]
    fn limit_inside_identifier_is_not_a_limit() {
        assert_eq!(
            apply_row_limit("SELECT credit_limited FROM t", 10),
            "SELECT credit_limited FROM t LIMIT 10"
        );
    }
}
