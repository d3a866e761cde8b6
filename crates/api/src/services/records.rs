//! # Record Writer
//!
//! Presence marks are upserted per (event, person), so resubmitting a batch
//! converges on the same rows. Non-admin callers may only mark people in the
//! groups they lead; anything else in a batch is dropped, not rejected.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rollcall_core::{
    errors::{AttendanceError, AttendanceResult},
    models::{
        event::AttendanceEvent,
        record::{
            normalize_note, AddGuestRequest, AttendanceGuest, NewGuest, RecordInput,
            MAX_GUEST_NAME_LEN, MAX_NOTE_LEN,
        },
    },
    permissions::{Caller, PermissionLevel},
};
use tracing::warn;
use uuid::Uuid;

use super::{
    scope::{resolve_scope, GroupScope},
    AttendanceContext,
};

async fn load_event(ctx: &AttendanceContext, caller: &Caller, event_id: Uuid) -> AttendanceResult<AttendanceEvent> {
    ctx.store
        .find_event(caller.organization_id, event_id)
        .await?
        .ok_or_else(|| AttendanceError::NotFound(format!("Event with ID {} not found", event_id)))
}

fn checked_note(note: Option<&str>) -> AttendanceResult<Option<String>> {
    let note = normalize_note(note);
    if let Some(note) = &note {
        if note.chars().count() > MAX_NOTE_LEN {
            return Err(AttendanceError::Validation(format!(
                "Note must be at most {} characters",
                MAX_NOTE_LEN
            )));
        }
    }
    Ok(note)
}

/// Saves a batch of presence marks and returns how many were written.
pub async fn save_records(
    ctx: &AttendanceContext,
    caller: &Caller,
    event_id: Uuid,
    records: Vec<RecordInput>,
    now: DateTime<Utc>,
) -> AttendanceResult<usize> {
    ctx.require(caller, PermissionLevel::Edit).await?;
    let event = load_event(ctx, caller, event_id).await?;

    // Validate the whole batch before writing any of it.
    let mut checked = Vec::with_capacity(records.len());
    for record in records {
        let note = checked_note(record.note.as_deref())?;
        checked.push((record.person_id, record.present, note));
    }

    let scope = resolve_scope(ctx, caller).await?;
    if !scope.is_admin() {
        let allowed: HashSet<Uuid> = if scope.groups().is_empty() {
            HashSet::new()
        } else {
            ctx.roster
                .list_members(caller.organization_id, Some(scope.group_ids().as_slice()))
                .await?
                .into_iter()
                .map(|p| p.id)
                .collect()
        };

        let submitted = checked.len();
        checked.retain(|(person_id, _, _)| allowed.contains(person_id));
        if checked.len() < submitted {
            warn!(
                "Dropped {} out-of-scope records from {} for event {}",
                submitted - checked.len(),
                caller.identity,
                event.id
            );
        }
    }

    if checked.is_empty() {
        return Err(AttendanceError::Authorization(
            "None of the submitted people are in your groups".to_string(),
        ));
    }

    for (person_id, present, note) in &checked {
        ctx.store
            .upsert_record(event.id, *person_id, *present, note.as_deref(), &caller.identity, now)
            .await?;
    }

    Ok(checked.len())
}

pub async fn add_guest(
    ctx: &AttendanceContext,
    caller: &Caller,
    event_id: Uuid,
    request: AddGuestRequest,
    now: DateTime<Utc>,
) -> AttendanceResult<AttendanceGuest> {
    ctx.require(caller, PermissionLevel::Edit).await?;

    let guest_name = request.guest_name.trim();
    if guest_name.is_empty() {
        return Err(AttendanceError::Validation("Guest name is required".to_string()));
    }
    if guest_name.chars().count() > MAX_GUEST_NAME_LEN {
        return Err(AttendanceError::Validation(format!(
            "Guest name must be at most {} characters",
            MAX_GUEST_NAME_LEN
        )));
    }
    let note = checked_note(request.note.as_deref())?;

    let event = load_event(ctx, caller, event_id).await?;

    if let Some(group_id) = request.group_id {
        let scope = resolve_scope(ctx, caller).await?;
        if !scope.contains(group_id) {
            // Admin scope holds every active group of the organization.
            if scope.is_admin() {
                return Err(AttendanceError::NotFound(format!("Group {} not found", group_id)));
            }
            return Err(AttendanceError::Authorization(format!(
                "Group {} is not one of your groups",
                group_id
            )));
        }
    }

    let guest = NewGuest {
        event_id: event.id,
        group_id: request.group_id,
        guest_name: guest_name.to_string(),
        note,
        added_by: caller.identity.clone(),
        created_at: now,
    };
    Ok(ctx.store.insert_guest(&guest).await?)
}

/// Guests of an event the caller may see: all of them for admins, otherwise
/// those in the caller's groups or added by the caller.
pub async fn list_guests(
    ctx: &AttendanceContext,
    caller: &Caller,
    event_id: Uuid,
) -> AttendanceResult<Vec<AttendanceGuest>> {
    ctx.require(caller, PermissionLevel::View).await?;
    let event = load_event(ctx, caller, event_id).await?;

    let guests = ctx.store.list_guests(event.id).await?;
    let scope = resolve_scope(ctx, caller).await?;
    Ok(match &scope {
        GroupScope::All(_) => guests,
        GroupScope::Led(_) => guests
            .into_iter()
            .filter(|g| g.added_by == caller.identity || g.group_id.is_some_and(|id| scope.contains(id)))
            .collect(),
    })
}
