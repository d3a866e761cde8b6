use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::{AttendanceError, AttendanceResult},
    timezone::{parse_local_time, parse_timezone},
};

/// A recurring weekly rule describing when check-in opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSchedule {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// Day of week, Sunday = 0
    pub weekday: u8,
    /// `HH:MM` or `HH:MM:SS` in `timezone`
    pub start_time_local: String,
    pub timezone: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    pub weekday: i64,
    pub start_time_local: String,
    pub timezone: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    pub weekday: Option<i64>,
    pub start_time_local: Option<String>,
    pub timezone: Option<String>,
    pub active: Option<bool>,
}

/// Validated fields for inserting or rewriting a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleFields {
    pub weekday: u8,
    pub start_time_local: String,
    pub timezone: String,
    pub active: bool,
}

impl ScheduleFields {
    pub fn validate(
        weekday: i64,
        start_time_local: &str,
        timezone: &str,
        active: bool,
    ) -> AttendanceResult<Self> {
        let weekday = validate_weekday(weekday)?;
        let start_time_local = start_time_local.trim();
        parse_local_time(start_time_local)?;
        let timezone = parse_timezone(timezone)?;

        Ok(Self {
            weekday,
            start_time_local: start_time_local.to_string(),
            timezone: timezone.name().to_string(),
            active,
        })
    }

    /// Applies a partial update on top of an existing schedule.
    pub fn merge(current: &AttendanceSchedule, update: &UpdateScheduleRequest) -> AttendanceResult<Self> {
        Self::validate(
            update.weekday.unwrap_or(i64::from(current.weekday)),
            update.start_time_local.as_deref().unwrap_or(&current.start_time_local),
            update.timezone.as_deref().unwrap_or(&current.timezone),
            update.active.unwrap_or(current.active),
        )
    }
}

pub fn validate_weekday(weekday: i64) -> AttendanceResult<u8> {
    if (0..=6).contains(&weekday) {
        Ok(weekday as u8)
    } else {
        Err(AttendanceError::Validation(format!(
            "Weekday must be between 0 (Sunday) and 6 (Saturday), got {}",
            weekday
        )))
    }
}
