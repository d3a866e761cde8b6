use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rollcall_core::models::{
    event::{AttendanceEvent, OpenEventRequest},
    record::{AddGuestRequest, AttendanceGuest, SaveRecordsRequest, SaveRecordsResponse},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    middleware::{auth::AuthenticatedCaller, error_handling::AppError},
    services::{events, records},
    ApiState,
};

#[axum::debug_handler]
pub async fn open_event(
    State(state): State<Arc<ApiState>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Json(payload): Json<OpenEventRequest>,
) -> Result<(StatusCode, Json<AttendanceEvent>), AppError> {
    let event = events::open_event(
        &state.ctx,
        state.opener.dispatcher(),
        &caller,
        payload,
        Utc::now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

#[axum::debug_handler]
pub async fn save_records(
    State(state): State<Arc<ApiState>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<SaveRecordsRequest>,
) -> Result<Json<SaveRecordsResponse>, AppError> {
    let saved = records::save_records(&state.ctx, &caller, event_id, payload.records, Utc::now()).await?;
    Ok(Json(SaveRecordsResponse { saved }))
}

#[axum::debug_handler]
pub async fn list_guests(
    State(state): State<Arc<ApiState>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<AttendanceGuest>>, AppError> {
    let guests = records::list_guests(&state.ctx, &caller, event_id).await?;
    Ok(Json(guests))
}

#[axum::debug_handler]
pub async fn add_guest(
    State(state): State<Arc<ApiState>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<AddGuestRequest>,
) -> Result<(StatusCode, Json<AttendanceGuest>), AppError> {
    let guest = records::add_guest(&state.ctx, &caller, event_id, payload, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(guest)))
}
