//! # Check-in View Builder
//!
//! Read-only. Picks the current event for the caller's organization and
//! merges the caller's visible roster with whatever has been recorded so far.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rollcall_core::{
    errors::AttendanceResult,
    models::{
        checkin::{CheckinEntry, CheckinGroup, CheckinView},
        event::AttendanceEvent,
        group::Person,
        record::AttendanceRecord,
    },
    permissions::{Caller, PermissionLevel},
};
use uuid::Uuid;

use super::{
    scope::{resolve_scope, GroupScope},
    AttendanceContext,
};

/// How long a non-open event stays current after it was opened.
pub const RECENT_EVENT_WINDOW_HOURS: i64 = 48;

pub const UNASSIGNED_GROUP_NAME: &str = "Unassigned";

/// The most recently opened open event, else the most recent event opened
/// within [`RECENT_EVENT_WINDOW_HOURS`] of `now`.
pub async fn current_event(
    ctx: &AttendanceContext,
    organization_id: Uuid,
    now: DateTime<Utc>,
) -> AttendanceResult<Option<AttendanceEvent>> {
    if let Some(event) = ctx.store.latest_open_event(organization_id).await? {
        return Ok(Some(event));
    }

    let since = now - Duration::hours(RECENT_EVENT_WINDOW_HOURS);
    Ok(ctx.store.latest_event_since(organization_id, since).await?)
}

pub async fn build_view(
    ctx: &AttendanceContext,
    caller: &Caller,
    now: DateTime<Utc>,
) -> AttendanceResult<CheckinView> {
    ctx.require(caller, PermissionLevel::View).await?;

    let Some(event) = current_event(ctx, caller.organization_id, now).await? else {
        return Ok(CheckinView::empty());
    };

    let scope = resolve_scope(ctx, caller).await?;
    if !scope.is_admin() && scope.groups().is_empty() {
        return Ok(CheckinView {
            event: Some(event),
            groups: Vec::new(),
        });
    }

    let members = visible_members(ctx, caller, &scope).await?;
    let records: HashMap<Uuid, AttendanceRecord> = ctx
        .store
        .list_records(event.id)
        .await?
        .into_iter()
        .map(|r| (r.person_id, r))
        .collect();

    Ok(CheckinView {
        event: Some(event),
        groups: group_entries(&scope, members, &records),
    })
}

async fn visible_members(
    ctx: &AttendanceContext,
    caller: &Caller,
    scope: &GroupScope,
) -> AttendanceResult<Vec<Person>> {
    let group_ids = scope.group_ids();

    if scope.is_admin() {
        // Members of inactive groups are left out; unassigned people stay.
        let members = ctx.roster.list_members(caller.organization_id, None).await?;
        Ok(members
            .into_iter()
            .filter(|p| p.group_id.is_none_or(|g| group_ids.contains(&g)))
            .collect())
    } else {
        Ok(ctx
            .roster
            .list_members(caller.organization_id, Some(group_ids.as_slice()))
            .await?)
    }
}

fn group_entries(
    scope: &GroupScope,
    members: Vec<Person>,
    records: &HashMap<Uuid, AttendanceRecord>,
) -> Vec<CheckinGroup> {
    let mut buckets: HashMap<Option<Uuid>, Vec<CheckinEntry>> = HashMap::new();
    for person in members {
        let record = records.get(&person.id);
        buckets.entry(person.group_id).or_default().push(CheckinEntry {
            person_id: person.id,
            name: person.name,
            present: record.map(|r| r.present),
            note: record.and_then(|r| r.note.clone()).unwrap_or_default(),
        });
    }

    let mut groups: Vec<&_> = scope.groups().iter().collect();
    groups.sort_by(|a, b| a.name.cmp(&b.name));

    let mut view: Vec<CheckinGroup> = groups
        .into_iter()
        .map(|group| CheckinGroup {
            group_id: Some(group.id),
            name: group.name.clone(),
            entries: sorted(buckets.remove(&Some(group.id)).unwrap_or_default()),
        })
        .collect();

    if let Some(unassigned) = buckets.remove(&None) {
        view.push(CheckinGroup {
            group_id: None,
            name: UNASSIGNED_GROUP_NAME.to_string(),
            entries: sorted(unassigned),
        });
    }

    view
}

fn sorted(mut entries: Vec<CheckinEntry>) -> Vec<CheckinEntry> {
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}
