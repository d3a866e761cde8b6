use chrono::{DateTime, Utc};
use rollcall_core::{
    errors::{AttendanceError, AttendanceResult},
    models::event::{AttendanceEvent, InsertOutcome, NewEvent, OpenEventRequest},
    permissions::{Caller, PermissionLevel},
    timezone::{local_date_time_to_instant, parse_local_time, parse_timezone},
};
use tracing::{info, warn};

use super::{dispatcher::NotificationDispatcher, AttendanceContext};

/// Opens an event by hand, outside any schedule.
///
/// Without a start time the event starts when it is opened. Leaders are
/// notified the same way as for scheduled events.
pub async fn open_event(
    ctx: &AttendanceContext,
    dispatcher: &NotificationDispatcher,
    caller: &Caller,
    request: OpenEventRequest,
    now: DateTime<Utc>,
) -> AttendanceResult<AttendanceEvent> {
    ctx.require(caller, PermissionLevel::Admin).await?;

    let timezone = parse_timezone(&request.timezone)?;
    let starts_at = match request.start_time_local.as_deref().map(str::trim) {
        Some(start) if !start.is_empty() => {
            local_date_time_to_instant(request.event_date_local, parse_local_time(start)?, timezone)
        }
        _ => now,
    };

    let new_event = NewEvent {
        organization_id: caller.organization_id,
        schedule_id: None,
        event_date_local: request.event_date_local,
        starts_at,
        opened_at: now,
        created_by_system: false,
    };

    let event = match ctx.store.insert_event(&new_event).await? {
        InsertOutcome::Created(event) => event,
        InsertOutcome::AlreadyExists => {
            return Err(AttendanceError::Validation(format!(
                "An event for {} already exists",
                request.event_date_local
            )));
        }
    };
    info!("Event {} opened manually by {}", event.id, caller.identity);

    if let Err(e) = dispatcher.dispatch_event_opened(&event).await {
        warn!("Notifications for event {} failed: {}", event.id, e);
    }

    Ok(event)
}
