//! Request and response bodies of the HTTP API.

use medquery::types::{ColumnInfo, TableRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /ask`.
#[derive(Debug, Deserialize, Serialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AskBody {
    /// The executed statement, or an empty string when none was generated.
    pub sql: String,
    pub rows: Vec<Value>,
    pub message: String,
    /// The formatted textual answer.
    pub answer: String,
}

/// Body of `POST /run_sql`.
#[derive(Debug, Deserialize, Serialize)]
pub struct RunSqlRequest {
    pub sql: String,
    /// Positional parameters bound to `?` placeholders.
    #[serde(default)]
    pub params: Option<Vec<Value>>,
    /// Overrides the configured row cap for this call.
    #[serde(default)]
    pub row_limit: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RunSqlBody {
    pub sql: String,
    pub rows: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TablesBody {
    pub tables: Vec<TableRef>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SchemaBody {
    pub schema: String,
    pub table: String,
    pub columns: Vec<ColumnInfo>,
}
