//! # Route Handlers
//!
//! Handlers are grouped by concern: liveness, database introspection and raw
//! SQL, and question answering.

pub mod ask_handlers;
pub mod db_handlers;
pub mod general;

pub use self::{
    ask_handlers::ask_handler,
    db_handlers::{get_schema_handler, list_tables_handler, run_sql_handler},
    general::{health_check, root},
};

/// The status line shared by `/ask` and `/run_sql` for a successful statement.
pub(crate) fn records_message(count: usize) -> String {
    if count == 0 {
        "No matching records found.".to_string()
    } else {
        format!("{count} record(s) found.")
    }
}
