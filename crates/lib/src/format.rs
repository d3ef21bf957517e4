//! # Result Formatting
//!
//! Turns a [`QueryResult`] into the short textual answer shown to the user.

use crate::{constants, types::QueryResult};
use serde_json::Value;
use std::time::Duration;

/// Spells out a timeout: whole seconds as `"30 seconds"`, anything finer as `"250 ms"`.
pub fn describe_duration(duration: &Duration) -> String {
    match duration.as_secs() {
        secs if secs > 0 && duration.subsec_nanos() == 0 => {
            if secs == 1 {
                "1 second".to_string()
            } else {
                format!("{secs} seconds")
            }
        }
        _ => format!("{} ms", duration.as_millis()),
    }
}

/// Renders a single cell. Strings are unquoted and NULL is spelled out.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Formats a result set as a sentence, a joined list, or one line per row.
///
/// - no rows: `"No records found."`
/// - one row with one numeric column: `"The answer is 42."`
/// - every row with one column: `"Results: Alice, Bob"`
/// - anything else: `"name: Alice, gender: Female"` lines joined by newlines
pub fn format_result(result: &QueryResult) -> String {
    if result.rows.is_empty() {
        return constants::NO_RECORDS_FOUND.to_string();
    }

    if let [row] = result.rows.as_slice() {
        if let [value @ Value::Number(_)] = row.as_slice() {
            return format!("The answer is {value}.");
        }
    }

    if result.rows.iter().all(|row| row.len() == 1) {
        let items: Vec<String> = result.rows.iter().map(|row| render_value(&row[0])).collect();
        return format!("Results: {}", items.join(", "));
    }

    result
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, value)| {
                    let column = result.columns.get(i).map(String::as_str).unwrap_or("?");
                    format!("{column}: {}", render_value(value))
                })
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
