use chrono::{DateTime, NaiveDate, Utc};
use eyre::{eyre, Result};
use rollcall_core::{
    models::{
        event::AttendanceEvent,
        group::{GroupLeader, Person, SmallGroup},
        notification::Notification,
        record::{AttendanceGuest, AttendanceRecord},
        schedule::AttendanceSchedule,
    },
    permissions::{Caller, MemberStatus, Role},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSchedule {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub weekday: i16,
    pub start_time_local: String,
    pub timezone: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbEvent {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub schedule_id: Option<Uuid>,
    pub event_date_local: NaiveDate,
    pub starts_at: DateTime<Utc>,
    pub status: String,
    pub opened_at: DateTime<Utc>,
    pub created_by_system: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbRecord {
    pub event_id: Uuid,
    pub person_id: Uuid,
    pub present: bool,
    pub note: Option<String>,
    pub marked_by: String,
    pub marked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbGuest {
    pub id: Uuid,
    pub event_id: Uuid,
    pub group_id: Option<Uuid>,
    pub guest_name: String,
    pub note: Option<String>,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSmallGroup {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub track: Option<String>,
    pub section: Option<String>,
    pub active: bool,
    pub leader_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPerson {
    pub id: Uuid,
    pub name: String,
    pub small_group_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbGroupLeader {
    pub identity: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbNotification {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub recipient: String,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub action_link: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSession {
    pub identity: String,
    pub organization_id: Uuid,
    pub role: String,
    pub status: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPermissionOverride {
    pub module: String,
    pub role: String,
    pub level: String,
}

impl TryFrom<DbSchedule> for AttendanceSchedule {
    type Error = eyre::Report;

    fn try_from(row: DbSchedule) -> Result<Self> {
        let weekday = u8::try_from(row.weekday)
            .ok()
            .filter(|day| *day <= 6)
            .ok_or_else(|| eyre!("schedule {} has invalid weekday {}", row.id, row.weekday))?;

        Ok(Self {
            id: row.id,
            organization_id: row.organization_id,
            weekday,
            start_time_local: row.start_time_local,
            timezone: row.timezone,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<DbEvent> for AttendanceEvent {
    type Error = eyre::Report;

    fn try_from(row: DbEvent) -> Result<Self> {
        Ok(Self {
            id: row.id,
            organization_id: row.organization_id,
            schedule_id: row.schedule_id,
            event_date_local: row.event_date_local,
            starts_at: row.starts_at,
            status: row.status.parse().map_err(|e: String| eyre!(e))?,
            opened_at: row.opened_at,
            created_by_system: row.created_by_system,
        })
    }
}

impl From<DbRecord> for AttendanceRecord {
    fn from(row: DbRecord) -> Self {
        Self {
            event_id: row.event_id,
            person_id: row.person_id,
            present: row.present,
            note: row.note,
            marked_by: row.marked_by,
            marked_at: row.marked_at,
        }
    }
}

impl From<DbGuest> for AttendanceGuest {
    fn from(row: DbGuest) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            group_id: row.group_id,
            guest_name: row.guest_name,
            note: row.note,
            added_by: row.added_by,
            created_at: row.created_at,
        }
    }
}

impl From<DbSmallGroup> for SmallGroup {
    fn from(row: DbSmallGroup) -> Self {
        Self {
            id: row.id,
            organization_id: row.organization_id,
            name: row.name,
            track: row.track,
            section: row.section,
            active: row.active,
            leader_ids: row.leader_ids,
        }
    }
}

impl From<DbPerson> for Person {
    fn from(row: DbPerson) -> Self {
        Self {
            id: row.id,
            name: row.name,
            group_id: row.small_group_id,
        }
    }
}

impl From<DbGroupLeader> for GroupLeader {
    fn from(row: DbGroupLeader) -> Self {
        Self {
            identity: row.identity,
            name: row.name,
            email: row.email,
        }
    }
}

impl From<DbNotification> for Notification {
    fn from(row: DbNotification) -> Self {
        Self {
            id: row.id,
            organization_id: row.organization_id,
            recipient: row.recipient,
            kind: row.kind,
            title: row.title,
            body: row.body,
            action_link: row.action_link,
            created_at: row.created_at,
            read_at: row.read_at,
        }
    }
}

impl TryFrom<DbSession> for Caller {
    type Error = eyre::Report;

    fn try_from(row: DbSession) -> Result<Self> {
        Ok(Self {
            identity: row.identity,
            organization_id: row.organization_id,
            role: row.role.parse::<Role>().map_err(|e| eyre!(e))?,
            status: row.status.parse::<MemberStatus>().map_err(|e| eyre!(e))?,
            name: row.name,
        })
    }
}
