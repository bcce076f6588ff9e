use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde_json::json;
use tracing::error;

/// Handler-level error mapped onto an HTTP status with a JSON body.
///
/// Internal errors are logged server-side and never leak their message
/// to the client; bad requests echo the problem back.
#[derive(Debug)]
pub enum AppError {
    Internal(anyhow::Error),
    BadRequest(anyhow::Error),
}

impl AppError {
    pub fn bad_request(error: anyhow::Error) -> Self {
        Self::BadRequest(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Internal(cause) => {
                error!(error = %cause, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(cause) => (StatusCode::BAD_REQUEST, cause.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
