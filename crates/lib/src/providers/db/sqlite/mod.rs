use crate::{
    errors::PromptError,
    providers::db::{
        pool::{ConnectionPool, PoolOptions},
        storage::Storage,
    },
    types::{ColumnInfo, QueryResult, TableRef},
};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::{
    fmt::{self, Debug},
    sync::OnceLock,
};
use tracing::{debug, info};
use turso::{Connection, Database, Value as TursoValue};

pub mod sql;

/// A provider for interacting with a local SQLite database using Turso.
///
/// Statements run on connections drawn from a bounded [`ConnectionPool`]. When cloned,
/// the provider shares the same database and pool, so clones of an in-memory provider
/// see the same data and compete for the same connections.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
    pool: ConnectionPool,
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` with the default pool size.
    ///
    /// # Arguments
    ///
    /// * `db_path`: The path to the SQLite database file. Use ":memory:" for a unique,
    ///   isolated in-memory database; clone the provider to share it.
    pub async fn new(db_path: &str) -> Result<Self, PromptError> {
        Self::with_pool_options(db_path, PoolOptions::default()).await
    }

    /// Creates a new `SqliteProvider` whose pool is sized by `options`.
    pub async fn with_pool_options(
        db_path: &str,
        options: PoolOptions,
    ) -> Result<Self, PromptError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        // WAL lets readers proceed while another connection writes. No effect in memory.
        let conn = db
            .connect()
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| PromptError::StorageConnection(e.to_string()))?;

        let pool = ConnectionPool::new(db.clone(), options)?;
        info!(db_path = %db_path, ?options, "Opened SQLite database.");

        Ok(Self { db, pool })
    }

    /// The pool statements are executed on.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Executes a batch of `;`-separated statements, e.g. to seed a database.
    pub async fn initialize_with_data(&self, init_sql: &str) -> Result<(), PromptError> {
        let statements: Vec<&str> = init_sql
            .split(';')
            .filter(|s| !s.trim().is_empty())
            .collect();
        let mut conn = self.pool.acquire().await?;
        let result = run_batch(&conn, &statements).await;
        conn.finish();
        result
    }

    /// Ensures that the medical records tables exist.
    /// This function is idempotent and safe to call on every application startup.
    pub async fn initialize_schema(&self) -> Result<(), PromptError> {
        let mut conn = self.pool.acquire().await?;
        let result = run_batch(&conn, sql::ALL_TABLE_CREATION_SQL).await;
        conn.finish();
        result
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl AsRef<Database> for SqliteProvider {
    fn as_ref(&self) -> &Database {
        &self.db
    }
}

/// Converts a Turso value to a serde_json::Value.
fn turso_value_to_json(v: TursoValue) -> Value {
    match v {
        TursoValue::Null => Value::Null,
        TursoValue::Integer(i) => Value::Number(i.into()),
        TursoValue::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        TursoValue::Text(s) => Value::String(s),
        TursoValue::Blob(_) => Value::String("<blob>".to_string()),
    }
}

/// Converts a JSON statement parameter to a Turso value.
fn json_to_turso_value(v: Value) -> TursoValue {
    match v {
        Value::Null => TursoValue::Null,
        Value::Bool(b) => TursoValue::Integer(i64::from(b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => TursoValue::Integer(i),
            None => TursoValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => TursoValue::Text(s),
        other => TursoValue::Text(other.to_string()),
    }
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex is valid"))
}

/// Rejects anything that is not a plain identifier before it is interpolated.
fn check_identifier(name: &str) -> Result<&str, PromptError> {
    if identifier_re().is_match(name) {
        Ok(name)
    } else {
        Err(PromptError::StorageOperationFailed(format!(
            "Invalid identifier: '{name}'"
        )))
    }
}

/// Runs statements in order on one connection, stopping at the first failure.
async fn run_batch(conn: &Connection, statements: &[&str]) -> Result<(), PromptError> {
    for statement in statements {
        conn.execute(statement, ())
            .await
            .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;
    }
    Ok(())
}

/// Prepares and runs one statement, reading column names from its descriptor.
async fn run_statement(
    conn: &Connection,
    query: &str,
    params: Vec<Value>,
) -> Result<QueryResult, PromptError> {
    let mut stmt = conn
        .prepare(query)
        .await
        .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;

    let columns: Vec<String> = stmt
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let params: Vec<TursoValue> = params.into_iter().map(json_to_turso_value).collect();
    let mut rows = stmt
        .query(params)
        .await
        .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;

    let mut result_rows = Vec::new();
    while let Some(row) = rows
        .next()
        .await
        .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?
    {
        let mut values = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            let value = row
                .get_value(i)
                .map_err(|e| PromptError::StorageOperationFailed(e.to_string()))?;
            values.push(turso_value_to_json(value));
        }
        result_rows.push(values);
    }

    Ok(QueryResult::new(columns, result_rows))
}

#[async_trait]
impl Storage for SqliteProvider {
    fn name(&self) -> &str {
        "SQLite"
    }

    /// Executes a statement on a pooled connection and collects every row.
    async fn execute_query_with_params(
        &self,
        query: &str,
        params: Vec<Value>,
    ) -> Result<QueryResult, PromptError> {
        debug!(query = %query, params = params.len(), "--> Executing SQLite query");

        let mut conn = self.pool.acquire().await?;
        let result = run_statement(&conn, query, params).await;
        conn.finish();

        let result = result?;
        debug!(rows = result.rows.len(), "<-- SQLite query finished");
        Ok(result)
    }

    async fn distinct_values(
        &self,
        table: &str,
        column: &str,
    ) -> Result<Vec<String>, PromptError> {
        let query = sql::distinct_values(check_identifier(table)?, check_identifier(column)?);
        let result = self.execute_query(&query).await?;

        let values = result
            .rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .filter_map(|value| match value {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.trim().is_empty())
            .collect();
        Ok(values)
    }

    async fn list_tables(&self) -> Result<Vec<TableRef>, PromptError> {
        info!("Listing all tables in SQLite database.");
        let result = self.execute_query(sql::LIST_TABLES_SQL).await?;

        let tables = result
            .rows
            .into_iter()
            .filter_map(|row| match row.into_iter().next() {
                Some(Value::String(name)) => Some(TableRef {
                    schema: sql::MAIN_SCHEMA.to_string(),
                    table: name,
                }),
                _ => None,
            })
            .collect();
        Ok(tables)
    }

    /// Describes a table of the `main` schema. Other schema names have no tables.
    async fn get_table_schema(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnInfo>, PromptError> {
        if schema != sql::MAIN_SCHEMA {
            debug!(schema = %schema, "Unknown schema requested.");
            return Ok(Vec::new());
        }

        let query = sql::table_info(check_identifier(table)?);
        let result = self.execute_query(&query).await?;

        let columns: Vec<ColumnInfo> = result
            .rows
            .into_iter()
            .filter_map(|row| match (row.get(1), row.get(2)) {
                (Some(Value::String(name)), Some(Value::String(type_str))) => Some(ColumnInfo {
                    column: name.clone(),
                    r#type: type_str.to_uppercase(),
                }),
                _ => None,
            })
            .collect();

        info!(table = %table, "Fetched schema with {} columns.", columns.len());
        Ok(columns)
    }
}
