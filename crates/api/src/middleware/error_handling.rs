//! # Error Handling Middleware
//!
//! Maps [`AttendanceError`] to HTTP status codes and a JSON body of the form
//! `{"error": "<message>"}` so every handler fails the same way.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rollcall_core::errors::AttendanceError;
use serde_json::json;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use rollcall_api::middleware::error_handling::AppError;
/// use rollcall_core::errors::AttendanceError;
///
/// async fn handler(found: bool) -> Result<Json<u32>, AppError> {
///     if !found {
///         return Err(AttendanceError::NotFound("event".to_string()).into());
///     }
///     Ok(Json(1))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub AttendanceError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AttendanceError::NotFound(_) => StatusCode::NOT_FOUND,
            AttendanceError::Validation(_) => StatusCode::BAD_REQUEST,
            AttendanceError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AttendanceError::Authorization(_) => StatusCode::FORBIDDEN,
            AttendanceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AttendanceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
        }

        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl From<AttendanceError> for AppError {
    fn from(err: AttendanceError) -> Self {
        AppError(err)
    }
}

/// Storage errors surfacing directly in a handler are internal failures.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(AttendanceError::Database(err))
    }
}

/// Maps an AttendanceError to an HTTP response
pub fn map_error(err: AttendanceError) -> Response {
    AppError(err).into_response()
}
