use chrono::{DateTime, Utc};
use rollcall_core::{
    errors::{AttendanceError, AttendanceResult},
    models::notification::Notification,
    permissions::Caller,
};
use uuid::Uuid;

use super::AttendanceContext;

/// The caller's own notifications, newest first.
pub async fn list_notifications(ctx: &AttendanceContext, caller: &Caller) -> AttendanceResult<Vec<Notification>> {
    Ok(ctx
        .store
        .list_notifications(caller.organization_id, &caller.identity)
        .await?)
}

/// Marks one of the caller's notifications read. The first read time sticks.
pub async fn mark_read(
    ctx: &AttendanceContext,
    caller: &Caller,
    id: Uuid,
    now: DateTime<Utc>,
) -> AttendanceResult<Notification> {
    ctx.store
        .mark_notification_read(caller.organization_id, &caller.identity, id, now)
        .await?
        .ok_or_else(|| AttendanceError::NotFound(format!("Notification with ID {} not found", id)))
}
