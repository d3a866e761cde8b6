use axum::{extract::State, Json};
use chrono::Utc;
use rollcall_core::models::checkin::CheckinView;
use std::sync::Arc;

use crate::{
    middleware::{auth::AuthenticatedCaller, error_handling::AppError},
    services::checkin,
    ApiState,
};

#[axum::debug_handler]
pub async fn get_checkin(
    State(state): State<Arc<ApiState>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> Result<Json<CheckinView>, AppError> {
    let view = checkin::build_view(&state.ctx, &caller, Utc::now()).await?;
    Ok(Json(view))
}
