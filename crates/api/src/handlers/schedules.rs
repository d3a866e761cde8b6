use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rollcall_core::models::schedule::{
    AttendanceSchedule, CreateScheduleRequest, UpdateScheduleRequest,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    middleware::{auth::AuthenticatedCaller, error_handling::AppError},
    services::schedules,
    ApiState,
};

#[axum::debug_handler]
pub async fn create_schedule(
    State(state): State<Arc<ApiState>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Json(payload): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<AttendanceSchedule>), AppError> {
    let schedule = schedules::create_schedule(&state.ctx, &caller, payload).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

#[axum::debug_handler]
pub async fn list_schedules(
    State(state): State<Arc<ApiState>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> Result<Json<Vec<AttendanceSchedule>>, AppError> {
    let schedules = schedules::list_schedules(&state.ctx, &caller).await?;
    Ok(Json(schedules))
}

#[axum::debug_handler]
pub async fn update_schedule(
    State(state): State<Arc<ApiState>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateScheduleRequest>,
) -> Result<Json<AttendanceSchedule>, AppError> {
    let schedule = schedules::update_schedule(&state.ctx, &caller, id, payload).await?;
    Ok(Json(schedule))
}
