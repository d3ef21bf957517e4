//! # Authentication Middleware
//!
//! This module provides the Axum extractor that guards the data routes with a
//! static bearer token. Handlers that take an [`ApiToken`] argument are only
//! reached when the request carries `Authorization: Bearer <api_token>`.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde_json::json;
use tracing::{debug, warn};

use crate::state::AppState;

/// Proof that a request was authorized.
///
/// When no token is configured, every request is accepted.
#[derive(Debug, Clone, Copy)]
pub struct ApiToken;

/// A custom rejection type for authentication failures.
pub struct AuthError(StatusCode, String);

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl FromRequestParts<AppState> for ApiToken {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.api_token() else {
            return Ok(ApiToken);
        };

        let bearer_header =
            Option::<TypedHeader<Authorization<Bearer>>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    warn!("Unexpected error during header extraction: {}", e);
                    AuthError(
                        StatusCode::UNAUTHORIZED,
                        "Invalid Authorization header format.".to_string(),
                    )
                })?;

        match bearer_header {
            Some(TypedHeader(Authorization(bearer))) if bearer.token() == expected => {
                debug!("Bearer token accepted.");
                Ok(ApiToken)
            }
            Some(_) => {
                warn!("Rejected request with an invalid bearer token.");
                Err(AuthError(
                    StatusCode::UNAUTHORIZED,
                    "Invalid API token.".to_string(),
                ))
            }
            None => {
                warn!("Rejected request without an Authorization header.");
                Err(AuthError(
                    StatusCode::UNAUTHORIZED,
                    "Missing bearer token.".to_string(),
                ))
            }
        }
    }
}
