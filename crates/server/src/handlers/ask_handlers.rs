//! # Question Answering Handler
//!
//! `POST /ask` runs the full pipeline and reports every outcome with HTTP 200,
//! so clients read the `message` to tell a failure from an empty answer.

use super::records_message;
use crate::{
    auth::ApiToken,
    state::AppState,
    types::{AskBody, AskRequest},
};
use axum::{extract::State, Json};
use medquery::{format::describe_duration, AskOutcome, GenerationFailure};
use tracing::info;

/// Handler for `POST /ask`.
pub async fn ask_handler(
    _token: ApiToken,
    State(app_state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Json<AskBody> {
    info!("Received question: '{}'", payload.question);

    let response = app_state.prompt_client.ask(&payload.question).await;
    let answer = response.answer_text();

    let message = match &response.outcome {
        AskOutcome::Answered | AskOutcome::NoRecords => records_message(response.result.rows.len()),
        AskOutcome::GenerationFailed(GenerationFailure::EmptyQuestion | GenerationFailure::NoSql) => {
            "LLM failed to generate SQL.".to_string()
        }
        AskOutcome::GenerationFailed(GenerationFailure::ModelUnavailable(detail)) => {
            format!("Error generating SQL: {detail}")
        }
        AskOutcome::GenerationFailed(GenerationFailure::Timeout(timeout)) => format!(
            "Error generating SQL: the model did not answer within {}.",
            describe_duration(timeout)
        ),
        AskOutcome::ExecutionFailed(detail) => format!("Error executing SQL: {detail}"),
    };

    Json(AskBody {
        sql: response.sql.clone().unwrap_or_default(),
        rows: response.result.to_records(),
        message,
        answer,
    })
}
