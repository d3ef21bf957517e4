//! # Database Route Handlers
//!
//! This module contains handlers for direct database interaction endpoints:
//! listing tables, describing a table, and running caller-supplied SQL.

use super::records_message;
use crate::{
    auth::ApiToken,
    errors::AppError,
    state::AppState,
    types::{RunSqlBody, RunSqlRequest, SchemaBody, TablesBody},
};
use axum::{
    extract::{Path, State},
    Json,
};
use medquery::{executor, providers::db::storage::Storage};
use tracing::{info, warn};

/// Handler for `GET /list_tables`.
pub async fn list_tables_handler(
    _token: ApiToken,
    State(app_state): State<AppState>,
) -> Result<Json<TablesBody>, AppError> {
    let tables = app_state.sqlite_provider.list_tables().await?;
    info!("Listing {} tables.", tables.len());
    Ok(Json(TablesBody { tables }))
}

/// Handler for `GET /get_schema/{schema}/{table}`.
///
/// Responds with 404 when the table is unknown.
pub async fn get_schema_handler(
    _token: ApiToken,
    State(app_state): State<AppState>,
    Path((schema, table)): Path<(String, String)>,
) -> Result<Json<SchemaBody>, AppError> {
    let columns = app_state
        .sqlite_provider
        .get_table_schema(&schema, &table)
        .await?;
    if columns.is_empty() {
        return Err(AppError::NotFound(format!(
            "Table '{schema}.{table}' not found."
        )));
    }
    Ok(Json(SchemaBody {
        schema,
        table,
        columns,
    }))
}

/// Handler for `POST /run_sql`.
///
/// Runs the statement with positional parameters and the row cap. The body echoes
/// the caller's statement text. Execution errors are reported in the body with HTTP 200.
pub async fn run_sql_handler(
    _token: ApiToken,
    State(app_state): State<AppState>,
    Json(payload): Json<RunSqlRequest>,
) -> Json<RunSqlBody> {
    info!("Received raw SQL: '{}'", payload.sql);

    let RunSqlRequest {
        sql,
        params,
        row_limit,
    } = payload;
    let max_rows = row_limit.unwrap_or(app_state.config.max_rows);
    let result = executor::execute_with_params(
        &*app_state.sqlite_provider,
        &sql,
        params.unwrap_or_default(),
        max_rows,
        app_state.prompt_client.settings.query_timeout,
    )
    .await;

    match result {
        Ok(result) => Json(RunSqlBody {
            message: Some(records_message(result.rows.len())),
            rows: result.to_records(),
            error: None,
            sql,
        }),
        Err(e) => {
            warn!("Raw SQL failed: {e}");
            Json(RunSqlBody {
                sql,
                rows: Vec::new(),
                message: None,
                error: Some(e.to_string()),
            })
        }
    }
}
