use axum::{extract::State, http::HeaderMap, response::{IntoResponse, Response}, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    middleware::{auth::verify_cron_secret, error_handling::AppError},
    ApiState,
};

/// Runs one opener pass on behalf of the periodic trigger.
#[axum::debug_handler]
pub async fn run_attendance_opener(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Err(rejection) = verify_cron_secret(state.cron_secret.as_deref(), &headers) {
        return Ok(rejection);
    }

    let summary = state.opener.run(Utc::now()).await?;
    Ok(Json(summary).into_response())
}
