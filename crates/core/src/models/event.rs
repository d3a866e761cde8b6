use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event status. The opener only ever writes `Open`; events age out of being
/// "current" instead of being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Open,
    Closed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Open => "open",
            EventStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(EventStatus::Open),
            "closed" => Ok(EventStatus::Closed),
            other => Err(format!("unknown event status: {}", other)),
        }
    }
}

/// One concrete, dated check-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEvent {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub schedule_id: Option<Uuid>,
    pub event_date_local: NaiveDate,
    pub starts_at: DateTime<Utc>,
    pub status: EventStatus,
    pub opened_at: DateTime<Utc>,
    pub created_by_system: bool,
}

/// An event about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub organization_id: Uuid,
    pub schedule_id: Option<Uuid>,
    pub event_date_local: NaiveDate,
    pub starts_at: DateTime<Utc>,
    pub opened_at: DateTime<Utc>,
    pub created_by_system: bool,
}

/// Result of an insert guarded by the (schedule, local date) uniqueness rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Created(AttendanceEvent),
    AlreadyExists,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenEventRequest {
    pub event_date_local: NaiveDate,
    pub start_time_local: Option<String>,
    pub timezone: String,
}
