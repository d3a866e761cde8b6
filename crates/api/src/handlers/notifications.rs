use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use rollcall_core::models::notification::Notification;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    middleware::{auth::AuthenticatedCaller, error_handling::AppError},
    services::notifications,
    ApiState,
};

#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<Arc<ApiState>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = notifications::list_notifications(&state.ctx, &caller).await?;
    Ok(Json(notifications))
}

#[axum::debug_handler]
pub async fn mark_notification_read(
    State(state): State<Arc<ApiState>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let notification = notifications::mark_read(&state.ctx, &caller, id, Utc::now()).await?;
    Ok(Json(notification))
}
