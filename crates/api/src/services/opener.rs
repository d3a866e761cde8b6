//! # Event Opener
//!
//! One pass loads every active schedule and, for each schedule whose local
//! weekday matches and whose start time passed no more than
//! [`OPEN_TOLERANCE_MINUTES`] ago, opens the event for that local date.
//!
//! Creating the same event twice is prevented by the store's uniqueness rule
//! on (schedule, local date). The lookup before the insert only saves a write;
//! a lost race comes back as [`InsertOutcome::AlreadyExists`] and is counted
//! like any other already open event.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use futures::future::join_all;
use rollcall_core::{
    errors::{AttendanceError, AttendanceResult},
    models::{
        event::{AttendanceEvent, InsertOutcome, NewEvent},
        schedule::AttendanceSchedule,
    },
    timezone::{local_date_time_to_instant, local_parts, parse_local_time, parse_timezone},
};
use rollcall_db::store::AttendanceStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::dispatcher::NotificationDispatcher;

/// How late after the scheduled start an event may still be opened.
pub const OPEN_TOLERANCE_MINUTES: i64 = 70;

/// Whether a schedule should have an event at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Due {
    No,
    Yes {
        event_date_local: NaiveDate,
        starts_at: DateTime<Utc>,
    },
}

pub fn opening_due(schedule: &AttendanceSchedule, now: DateTime<Utc>) -> AttendanceResult<Due> {
    let timezone = parse_timezone(&schedule.timezone)?;
    let start = parse_local_time(&schedule.start_time_local)?;
    let local = local_parts(now, timezone);

    if local.weekday != schedule.weekday {
        return Ok(Due::No);
    }

    let start_minutes = i64::from(start.hour()) * 60 + i64::from(start.minute());
    let elapsed = local.minutes_of_day() - start_minutes;
    if !(0..=OPEN_TOLERANCE_MINUTES).contains(&elapsed) {
        return Ok(Due::No);
    }

    let event_date_local = local.date().ok_or_else(|| {
        AttendanceError::Validation(format!(
            "{}-{}-{} is not a calendar date",
            local.year, local.month, local.day
        ))
    })?;

    Ok(Due::Yes {
        event_date_local,
        starts_at: local_date_time_to_instant(event_date_local, start, timezone),
    })
}

/// Counts from one opener pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenerSummary {
    pub evaluated: usize,
    pub opened: usize,
    pub already_open: usize,
    pub not_due: usize,
    pub failed: usize,
}

enum Outcome {
    Opened,
    AlreadyOpen,
    NotDue,
    Failed,
}

pub struct EventOpener {
    store: Arc<dyn AttendanceStore>,
    dispatcher: NotificationDispatcher,
    store_timeout: Duration,
}

impl EventOpener {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        dispatcher: NotificationDispatcher,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            dispatcher,
            store_timeout,
        }
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Evaluates every active schedule at `now`.
    ///
    /// Only failing to load the schedules fails the pass. A schedule that
    /// errors or times out is counted as failed and the others carry on.
    pub async fn run(&self, now: DateTime<Utc>) -> AttendanceResult<OpenerSummary> {
        let schedules = tokio::time::timeout(self.store_timeout, self.store.list_active_schedules())
            .await
            .map_err(|_| {
                AttendanceError::Database(eyre::eyre!(
                    "Loading active schedules timed out after {:?}",
                    self.store_timeout
                ))
            })??;

        let outcomes = join_all(schedules.iter().map(|s| self.open_for_schedule(s, now))).await;

        let mut summary = OpenerSummary {
            evaluated: schedules.len(),
            ..OpenerSummary::default()
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Opened => summary.opened += 1,
                Outcome::AlreadyOpen => summary.already_open += 1,
                Outcome::NotDue => summary.not_due += 1,
                Outcome::Failed => summary.failed += 1,
            }
        }

        info!(
            "Opener pass: {} evaluated, {} opened, {} already open, {} not due, {} failed",
            summary.evaluated, summary.opened, summary.already_open, summary.not_due, summary.failed
        );
        Ok(summary)
    }

    async fn open_for_schedule(&self, schedule: &AttendanceSchedule, now: DateTime<Utc>) -> Outcome {
        let (event_date_local, starts_at) = match opening_due(schedule, now) {
            Ok(Due::Yes {
                event_date_local,
                starts_at,
            }) => (event_date_local, starts_at),
            Ok(Due::No) => return Outcome::NotDue,
            Err(e) => {
                error!("Schedule {} cannot be evaluated: {}", schedule.id, e);
                return Outcome::Failed;
            }
        };

        let new_event = NewEvent {
            organization_id: schedule.organization_id,
            schedule_id: Some(schedule.id),
            event_date_local,
            starts_at,
            opened_at: now,
            created_by_system: true,
        };

        let stored = tokio::time::timeout(self.store_timeout, self.store_event(schedule, &new_event)).await;
        let event = match stored {
            Ok(Ok(Some(event))) => event,
            Ok(Ok(None)) => {
                debug!("Schedule {} already open for {}", schedule.id, event_date_local);
                return Outcome::AlreadyOpen;
            }
            Ok(Err(e)) => {
                error!("Opening schedule {} for {} failed: {}", schedule.id, event_date_local, e);
                return Outcome::Failed;
            }
            Err(_) => {
                error!(
                    "Opening schedule {} for {} timed out after {:?}",
                    schedule.id, event_date_local, self.store_timeout
                );
                return Outcome::Failed;
            }
        };

        info!(
            "Opened event {} for schedule {} on {}",
            event.id, schedule.id, event_date_local
        );

        if let Err(e) = self.dispatcher.dispatch_event_opened(&event).await {
            warn!("Notifications for event {} failed: {}", event.id, e);
        }

        Outcome::Opened
    }

    /// Returns the created event, or `None` when one already exists.
    async fn store_event(
        &self,
        schedule: &AttendanceSchedule,
        new_event: &NewEvent,
    ) -> eyre::Result<Option<AttendanceEvent>> {
        let existing = self
            .store
            .find_event_for_schedule_date(schedule.id, new_event.event_date_local)
            .await?;
        if existing.is_some() {
            return Ok(None);
        }

        match self.store.insert_event(new_event).await? {
            InsertOutcome::Created(event) => Ok(Some(event)),
            InsertOutcome::AlreadyExists => Ok(None),
        }
    }
}
