//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use loopctl_domain::error::LoopError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`LoopError`] to an HTTP response with appropriate status code.
pub struct ApiError(LoopError);

impl From<LoopError> for ApiError {
    fn from(err: LoopError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            LoopError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            LoopError::Precondition(err) => (StatusCode::CONFLICT, err.to_string()),
            LoopError::ConstraintDenied(err) => (StatusCode::CONFLICT, err.to_string()),
            LoopError::NoProfile => (StatusCode::UNPROCESSABLE_ENTITY, self.0.to_string()),
            LoopError::Storage(err) => {
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
