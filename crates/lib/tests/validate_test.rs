//! # Literal Validation Tests
//!
//! Checks the case repair of known literals, both against hand-built value sets and
//! against the seeded test database.

mod common;

use crate::common::setup_tracing;
use async_trait::async_trait;
use medquery::{
    providers::db::storage::Storage,
    types::{ColumnInfo, QueryResult, TableRef},
    validate::{validate_literals, CanonicalLiterals, LiteralCategory},
    PromptError,
};
use medquery_test_utils::TestSetup;
use serde_json::Value;

fn sample_literals() -> CanonicalLiterals {
    CanonicalLiterals::new(vec![
        (
            LiteralCategory::Doctor,
            vec!["Dr. Emily Stone".to_string()],
        ),
        (
            LiteralCategory::Gender,
            vec!["Female".to_string(), "Male".to_string(), "Other".to_string()],
        ),
        (
            LiteralCategory::Disease,
            vec!["Diabetes".to_string(), "Hypertension".to_string()],
        ),
    ])
}

#[test]
fn test_literals_are_recased() {
    let literals = sample_literals();
    let sql = "SELECT COUNT(*) FROM patients p JOIN patient_conditions pc ON p.id = pc.patient_id JOIN diseases d ON d.id = pc.disease_id WHERE p.gender = 'female' AND d.name = 'DIABETES';";
    assert_eq!(
        literals.apply(sql),
        "SELECT COUNT(*) FROM patients p JOIN patient_conditions pc ON p.id = pc.patient_id JOIN diseases d ON d.id = pc.disease_id WHERE p.gender = 'Female' AND d.name = 'Diabetes';"
    );
}

#[test]
fn test_longer_words_are_left_alone() {
    let literals = sample_literals();
    let sql = "SELECT name FROM characters WHERE name = 'maleficent' OR role = 'females';";
    assert_eq!(literals.apply(sql), sql);
}

#[test]
fn test_validation_is_idempotent() {
    let literals = sample_literals();
    let sql = "SELECT * FROM doctors WHERE name = 'dr. emily stone' OR name LIKE '%male%';";
    let once = literals.apply(sql);
    let twice = literals.apply(&once);
    assert_eq!(once, twice);
    assert!(once.contains("'Dr. Emily Stone'"));
}

#[test]
fn test_regex_metacharacters_in_values_are_literal() {
    let literals = CanonicalLiterals::new(vec![(
        LiteralCategory::Medicine,
        vec!["Vitamin D (3)".to_string(), "$5 Plan".to_string()],
    )]);
    let sql = "SELECT * FROM medicines WHERE medicine_name IN ('vitamin d (3)', '$5 plan', 'Vitamin D 3');";
    assert_eq!(
        literals.apply(sql),
        "SELECT * FROM medicines WHERE medicine_name IN ('Vitamin D (3)', '$5 Plan', 'Vitamin D 3');"
    );
}

#[test]
fn test_categories_are_ordered_gender_first() {
    let literals = sample_literals();
    assert_eq!(
        literals.values(LiteralCategory::Gender),
        Some(&["Female".to_string(), "Male".to_string(), "Other".to_string()][..])
    );
    assert_eq!(literals.values(LiteralCategory::Medicine), None);
}

#[tokio::test]
async fn test_validate_literals_reads_values_from_database() {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();

    let sql = "SELECT COUNT(*) FROM medicines m JOIN patients p ON p.id = m.patient_id WHERE m.medicine_name = 'METFORMIN' AND p.gender = 'male';";
    let validated = validate_literals(&setup.provider, sql).await;
    assert_eq!(
        validated,
        "SELECT COUNT(*) FROM medicines m JOIN patients p ON p.id = m.patient_id WHERE m.medicine_name = 'Metformin' AND p.gender = 'Male';"
    );
}

#[tokio::test]
async fn test_fetch_loads_every_category_in_order() {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();

    let literals = CanonicalLiterals::fetch(&setup.provider).await;
    assert_eq!(
        literals.values(LiteralCategory::Gender).unwrap(),
        &["Female".to_string(), "Male".to_string(), "Other".to_string()][..]
    );
    assert_eq!(
        literals.values(LiteralCategory::Disease).unwrap(),
        &[
            "Asthma".to_string(),
            "Diabetes".to_string(),
            "Hypertension".to_string()
        ][..]
    );
    assert_eq!(literals.values(LiteralCategory::Doctor).unwrap().len(), 3);
}

/// A store whose every lookup fails.
#[derive(Clone, Debug)]
struct BrokenStorage;

#[async_trait]
impl Storage for BrokenStorage {
    fn name(&self) -> &str {
        "Broken"
    }

    async fn execute_query_with_params(
        &self,
        _query: &str,
        _params: Vec<Value>,
    ) -> Result<QueryResult, PromptError> {
        Err(PromptError::StorageOperationFailed("offline".to_string()))
    }

    async fn distinct_values(
        &self,
        _table: &str,
        _column: &str,
    ) -> Result<Vec<String>, PromptError> {
        Err(PromptError::StorageOperationFailed("offline".to_string()))
    }

    async fn list_tables(&self) -> Result<Vec<TableRef>, PromptError> {
        Ok(Vec::new())
    }

    async fn get_table_schema(
        &self,
        _schema: &str,
        _table: &str,
    ) -> Result<Vec<ColumnInfo>, PromptError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_lookup_failures_leave_sql_unchanged() {
    setup_tracing();
    let sql = "SELECT * FROM patients WHERE gender = 'female';";
    assert_eq!(validate_literals(&BrokenStorage, sql).await, sql);
}
