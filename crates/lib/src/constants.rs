//! # Shared Constants
//!
//! This module provides a centralized location for constants that are shared across
//! the crates in the `medquery` workspace, so the server, the CLI and the tests agree
//! on defaults and user-facing wording.

/// The default path for the medical records SQLite database.
pub const DEFAULT_DB_FILE: &str = "db/medical.db";

/// The row cap appended to statements that carry no `LIMIT` clause.
pub const DEFAULT_MAX_ROWS: u32 = 200;

/// Connections opened eagerly when a pool is created.
pub const DEFAULT_POOL_MIN_CONNECTIONS: usize = 1;

/// Upper bound on connections checked out at the same time.
pub const DEFAULT_POOL_MAX_CONNECTIONS: usize = 10;

/// Seconds to wait for the language model before giving up.
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;

/// Seconds to wait for a single statement before giving up.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

// --- User-facing messages ---

pub const NO_RECORDS_FOUND: &str = "No records found.";
pub const EMPTY_QUESTION: &str = "Please enter a question.";
pub const NO_SQL_PRODUCED: &str = "Could not generate SQL. Please rephrase your question.";
