//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use scenariobot_domain::error::BotError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`BotError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(BotError);

impl From<BotError> for ApiError {
    fn from(err: BotError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            BotError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            BotError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            BotError::Execution(err) => {
                tracing::error!(error = %err, "event execution error");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            BotError::Transport(err) => {
                tracing::error!(error = %err, "transport error");
                (StatusCode::BAD_GATEWAY, "chat transport unavailable".to_string())
            }
            BotError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
