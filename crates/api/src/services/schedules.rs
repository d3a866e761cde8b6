use rollcall_core::{
    errors::{AttendanceError, AttendanceResult},
    models::schedule::{
        AttendanceSchedule, CreateScheduleRequest, ScheduleFields, UpdateScheduleRequest,
    },
    permissions::{Caller, PermissionLevel},
};
use tracing::info;
use uuid::Uuid;

use super::AttendanceContext;

pub async fn create_schedule(
    ctx: &AttendanceContext,
    caller: &Caller,
    request: CreateScheduleRequest,
) -> AttendanceResult<AttendanceSchedule> {
    ctx.require(caller, PermissionLevel::Admin).await?;

    let fields = ScheduleFields::validate(
        request.weekday,
        &request.start_time_local,
        &request.timezone,
        request.active,
    )?;
    let schedule = ctx.store.create_schedule(caller.organization_id, &fields).await?;

    info!(
        "Schedule {} created by {} ({} {} {})",
        schedule.id, caller.identity, schedule.weekday, schedule.start_time_local, schedule.timezone
    );
    Ok(schedule)
}

pub async fn list_schedules(ctx: &AttendanceContext, caller: &Caller) -> AttendanceResult<Vec<AttendanceSchedule>> {
    ctx.require(caller, PermissionLevel::Admin).await?;
    Ok(ctx.store.list_schedules(caller.organization_id).await?)
}

/// Applies a partial update. Deactivation is `active: false`; schedules are
/// never deleted.
pub async fn update_schedule(
    ctx: &AttendanceContext,
    caller: &Caller,
    id: Uuid,
    request: UpdateScheduleRequest,
) -> AttendanceResult<AttendanceSchedule> {
    ctx.require(caller, PermissionLevel::Admin).await?;

    let not_found = || AttendanceError::NotFound(format!("Schedule with ID {} not found", id));
    let current = ctx
        .store
        .find_schedule(caller.organization_id, id)
        .await?
        .ok_or_else(not_found)?;

    let fields = ScheduleFields::merge(&current, &request)?;
    ctx.store
        .update_schedule(caller.organization_id, id, &fields)
        .await?
        .ok_or_else(not_found)
}
