//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use pageforge_domain::error::{DispatchError, PageForgeError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`PageForgeError`] to an HTTP response with appropriate status code.
pub struct ApiError(PageForgeError);

impl From<PageForgeError> for ApiError {
    fn from(err: PageForgeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            PageForgeError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            PageForgeError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            PageForgeError::Dispatch(DispatchError::Rejected { .. }) => {
                (StatusCode::UNAUTHORIZED, self.0.to_string())
            }
            PageForgeError::Dispatch(DispatchError::Timeout { .. }) => {
                (StatusCode::GATEWAY_TIMEOUT, self.0.to_string())
            }
            PageForgeError::Dispatch(DispatchError::Transport { .. }) => {
                (StatusCode::BAD_GATEWAY, self.0.to_string())
            }
            PageForgeError::Storage(err) => {
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
