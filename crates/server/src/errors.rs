use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medquery::PromptError;
use serde_json::json;
use tracing::error;

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors originating from the `medquery` library.
    Prompt(PromptError),
    /// A requested resource does not exist.
    NotFound(String),
}

/// Conversion from `PromptError` to `AppError`.
impl From<PromptError> for AppError {
    fn from(err: PromptError) -> Self {
        AppError::Prompt(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Prompt(err) => {
                // Log the original error for debugging purposes
                error!("PromptError: {:?}", err);
                match err {
                    PromptError::MissingAiProvider(_) | PromptError::MissingStorageProvider => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server is not configured correctly.".to_string(),
                    ),
                    err @ (PromptError::AiRequest(_)
                    | PromptError::AiDeserialization(_)
                    | PromptError::AiApi(_)) => (StatusCode::BAD_GATEWAY, err.to_string()),
                    err @ PromptError::StorageTimeout(_) => {
                        (StatusCode::GATEWAY_TIMEOUT, err.to_string())
                    }
                    PromptError::StorageConnection(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Storage provider connection error: {e}"),
                    ),
                    PromptError::StorageOperationFailed(e) => (
                        StatusCode::BAD_REQUEST,
                        format!("Storage operation failed: {e}"),
                    ),
                    PromptError::PoolClosed => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Connection pool is closed.".to_string(),
                    ),
                    PromptError::ReqwestClientBuild(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to build HTTP client: {e}"),
                    ),
                }
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
