//! # CLI Session Tests
//!
//! Runs the `medquery` binary against a seeded database file and a mocked
//! OpenAI-compatible model endpoint.

use assert_cmd::Command;
use httpmock::{Method::POST, MockServer};
use medquery::providers::db::sqlite::SqliteProvider;
use medquery_test_utils::SEED_DATA_SQL;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::tempdir;

fn seed_database(path: &Path) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let provider = SqliteProvider::new(path.to_str().unwrap()).await.unwrap();
        provider.initialize_schema().await.unwrap();
        provider.initialize_with_data(SEED_DATA_SQL).await.unwrap();
    });
}

fn medquery_command(db_path: &Path, api_url: &str, log_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("medquery").unwrap();
    cmd.env_clear()
        .arg("--db-url")
        .arg(db_path)
        .arg("--api-url")
        .arg(api_url)
        .arg("--log-file")
        .arg(log_path);
    cmd
}

#[test]
fn test_session_answers_from_the_database() {
    let temp_dir = tempdir().unwrap();
    let db_path = temp_dir.path().join("medical.db");
    seed_database(&db_path);

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .body_contains("female patients have diabetes");
        then.status(200).json_body(json!({
            "choices": [{"message": {"role": "assistant", "content":
                "SELECT COUNT(*) FROM patients p JOIN patient_conditions pc ON p.id = pc.patient_id JOIN diseases d ON d.id = pc.disease_id WHERE p.gender = 'FEMALE' AND d.name = 'DIABETES';"
            }}]
        }));
    });

    medquery_command(
        &db_path,
        &server.url("/v1/chat/completions"),
        &temp_dir.path().join("cli.log"),
    )
    .write_stdin("How many female patients have diabetes?\nexit\n")
    .assert()
    .success()
    .stdout(predicate::str::contains("Type 'exit' to quit."))
    .stdout(predicate::str::contains("Bot: The answer is 2."));

    mock.assert();
}

#[test]
fn test_no_validate_flag_keeps_literals() {
    let temp_dir = tempdir().unwrap();
    let db_path = temp_dir.path().join("medical.db");
    seed_database(&db_path);

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(json!({
            "choices": [{"message": {"role": "assistant", "content":
                "SELECT name FROM patients WHERE gender = 'female';"
            }}]
        }));
    });

    medquery_command(
        &db_path,
        &server.url("/v1/chat/completions"),
        &temp_dir.path().join("cli.log"),
    )
    .arg("--no-validate")
    .write_stdin("Which patients are female?\nquit\n")
    .assert()
    .success()
    .stdout(predicate::str::contains("Bot: No records found."));
}

#[test]
fn test_unknown_provider_fails_at_startup() {
    let temp_dir = tempdir().unwrap();

    medquery_command(
        &temp_dir.path().join("medical.db"),
        "http://127.0.0.1:9",
        &temp_dir.path().join("cli.log"),
    )
    .arg("--provider")
    .arg("carrier-pigeon")
    .write_stdin("exit\n")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Unsupported AI provider type"));
}
