use crate::errors::PromptError;
use crate::types::{ColumnInfo, QueryResult, TableRef};
use async_trait::async_trait;
use dyn_clone::DynClone;
use serde_json::Value;
use std::fmt::Debug;

/// A trait for interacting with a storage backend.
///
/// This trait defines the relational-store interface the pipeline depends on:
/// executing statements, reading column descriptors, and the small amount of
/// introspection needed by literal validation and the HTTP surface.
#[async_trait]
pub trait Storage: Send + Sync + DynClone + Debug {
    /// Returns the name of the storage provider (e.g., "SQLite").
    fn name(&self) -> &str;

    /// Returns the SQL dialect the model should target. Defaults to the provider name.
    fn dialect(&self) -> &str {
        self.name()
    }

    /// Executes a statement and returns the full row set with its column names.
    async fn execute_query(&self, query: &str) -> Result<QueryResult, PromptError> {
        self.execute_query_with_params(query, Vec::new()).await
    }

    /// Executes a statement with positional (`?`) parameters.
    async fn execute_query_with_params(
        &self,
        query: &str,
        params: Vec<Value>,
    ) -> Result<QueryResult, PromptError>;

    /// Returns the distinct, non-null values of `table.column` as strings.
    async fn distinct_values(&self, table: &str, column: &str)
        -> Result<Vec<String>, PromptError>;

    /// Lists the user tables of the store.
    async fn list_tables(&self) -> Result<Vec<TableRef>, PromptError>;

    /// Describes the columns of a table. An unknown table yields an empty list.
    async fn get_table_schema(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnInfo>, PromptError>;
}

dyn_clone::clone_trait_object!(Storage);
