//! # SQLite Specific SQL Queries
//!
//! This module centralizes SQL strings for the SQLite provider: the medical records
//! schema and the introspection queries. Callers must validate identifiers before
//! they are interpolated.

pub const CREATE_PATIENTS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS patients (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        gender TEXT,
        birth_date TEXT,
        age INTEGER,
        phone TEXT
    );
";

pub const CREATE_DISEASES_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS diseases (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT
    );
";

pub const CREATE_PATIENT_CONDITIONS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS patient_conditions (
        id INTEGER PRIMARY KEY,
        patient_id INTEGER NOT NULL,
        disease_id INTEGER NOT NULL,
        diagnosed_date TEXT,
        notes TEXT
    );
";

pub const CREATE_MEDICINES_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS medicines (
        id INTEGER PRIMARY KEY,
        patient_id INTEGER NOT NULL,
        medicine_name TEXT NOT NULL,
        dose TEXT,
        date TEXT
    );
";

pub const CREATE_DOCTORS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS doctors (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        specialization TEXT
    );
";

pub const CREATE_APPOINTMENTS_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS appointments (
        id INTEGER PRIMARY KEY,
        patient_id INTEGER NOT NULL,
        doctor_id INTEGER NOT NULL,
        appointment_date TEXT,
        notes TEXT
    );
";

/// Every table of the medical records schema, in creation order.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    CREATE_PATIENTS_TABLE_SQL,
    CREATE_DISEASES_TABLE_SQL,
    CREATE_PATIENT_CONDITIONS_TABLE_SQL,
    CREATE_MEDICINES_TABLE_SQL,
    CREATE_DOCTORS_TABLE_SQL,
    CREATE_APPOINTMENTS_TABLE_SQL,
];

/// Lists user tables, skipping SQLite's internal ones.
pub const LIST_TABLES_SQL: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name;";

/// The only schema name an SQLite database exposes for its own tables.
pub const MAIN_SCHEMA: &str = "main";

/// Returns the query that reads the distinct, non-null values of `table.column`.
pub fn distinct_values(table: &str, column: &str) -> String {
    format!("SELECT DISTINCT {column} FROM {table} WHERE {column} IS NOT NULL ORDER BY {column};")
}

/// Returns the `PRAGMA` that describes the columns of `table`.
///
/// Result columns: cid, name, type, notnull, dflt_value, pk.
pub fn table_info(table: &str) -> String {
    format!("PRAGMA table_info({table});")
}
