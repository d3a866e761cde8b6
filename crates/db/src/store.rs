//! Storage seams consumed by the attendance services.
//!
//! [`AttendanceStore`] covers the data this subsystem owns. [`RosterDirectory`]
//! and [`SessionGateway`] front collaborators owned by other parts of the
//! product. [`PgStore`] implements all three on PostgreSQL; the in-memory
//! variant in [`crate::mock`] backs the tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::Result;
use rollcall_core::{
    models::{
        event::{AttendanceEvent, InsertOutcome, NewEvent},
        group::{GroupLeader, Person, SmallGroup},
        notification::{NewNotification, Notification},
        record::{AttendanceGuest, AttendanceRecord, NewGuest},
        schedule::{AttendanceSchedule, ScheduleFields},
    },
    permissions::{self, Caller, Module, PermissionLevel, PermissionOverrides, Role},
};
use uuid::Uuid;

use crate::{DbPool, repositories};

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    // Schedules
    async fn create_schedule(&self, organization_id: Uuid, fields: &ScheduleFields) -> Result<AttendanceSchedule>;
    async fn find_schedule(&self, organization_id: Uuid, id: Uuid) -> Result<Option<AttendanceSchedule>>;
    async fn list_schedules(&self, organization_id: Uuid) -> Result<Vec<AttendanceSchedule>>;
    async fn list_active_schedules(&self) -> Result<Vec<AttendanceSchedule>>;
    async fn update_schedule(
        &self,
        organization_id: Uuid,
        id: Uuid,
        fields: &ScheduleFields,
    ) -> Result<Option<AttendanceSchedule>>;

    // Events
    /// Must honour uniqueness of (schedule id, local date) and report a
    /// collision as [`InsertOutcome::AlreadyExists`].
    async fn insert_event(&self, event: &NewEvent) -> Result<InsertOutcome>;
    async fn find_event_for_schedule_date(
        &self,
        schedule_id: Uuid,
        event_date_local: NaiveDate,
    ) -> Result<Option<AttendanceEvent>>;
    async fn find_event(&self, organization_id: Uuid, id: Uuid) -> Result<Option<AttendanceEvent>>;
    async fn latest_open_event(&self, organization_id: Uuid) -> Result<Option<AttendanceEvent>>;
    async fn latest_event_since(
        &self,
        organization_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Option<AttendanceEvent>>;

    // Records and guests
    async fn upsert_record(
        &self,
        event_id: Uuid,
        person_id: Uuid,
        present: bool,
        note: Option<&str>,
        marked_by: &str,
        marked_at: DateTime<Utc>,
    ) -> Result<AttendanceRecord>;
    async fn list_records(&self, event_id: Uuid) -> Result<Vec<AttendanceRecord>>;
    async fn insert_guest(&self, guest: &NewGuest) -> Result<AttendanceGuest>;
    async fn list_guests(&self, event_id: Uuid) -> Result<Vec<AttendanceGuest>>;

    // Groups
    async fn list_active_groups(&self, organization_id: Uuid) -> Result<Vec<SmallGroup>>;
    async fn list_groups_led_by(&self, organization_id: Uuid, identity: &str) -> Result<Vec<SmallGroup>>;
    async fn list_active_group_leaders(&self, organization_id: Uuid) -> Result<Vec<GroupLeader>>;

    // Notifications
    async fn insert_notification(&self, notification: &NewNotification) -> Result<Notification>;
    async fn list_notifications(&self, organization_id: Uuid, recipient: &str) -> Result<Vec<Notification>>;
    async fn mark_notification_read(
        &self,
        organization_id: Uuid,
        recipient: &str,
        id: Uuid,
        read_at: DateTime<Utc>,
    ) -> Result<Option<Notification>>;
}

#[async_trait]
pub trait RosterDirectory: Send + Sync {
    /// Members of the organization; `group_ids` restricts to members of those groups.
    async fn list_members(&self, organization_id: Uuid, group_ids: Option<&[Uuid]>) -> Result<Vec<Person>>;
}

#[async_trait]
pub trait SessionGateway: Send + Sync {
    async fn resolve_caller(&self, token: &str) -> Result<Option<Caller>>;
    async fn permission_overrides(&self, organization_id: Uuid) -> Result<PermissionOverrides>;

    async fn has_permission(&self, caller: &Caller, module: Module, level: PermissionLevel) -> Result<bool> {
        let overrides = self.permission_overrides(caller.organization_id).await?;
        Ok(permissions::has_permission(caller, module, level, &overrides))
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for PgStore {
    async fn create_schedule(&self, organization_id: Uuid, fields: &ScheduleFields) -> Result<AttendanceSchedule> {
        let row = repositories::schedule::create_schedule(&self.pool, organization_id, fields).await?;
        row.try_into()
    }

    async fn find_schedule(&self, organization_id: Uuid, id: Uuid) -> Result<Option<AttendanceSchedule>> {
        repositories::schedule::get_schedule_by_id(&self.pool, organization_id, id)
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn list_schedules(&self, organization_id: Uuid) -> Result<Vec<AttendanceSchedule>> {
        let rows = repositories::schedule::get_schedules_by_organization(&self.pool, organization_id).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_active_schedules(&self) -> Result<Vec<AttendanceSchedule>> {
        let rows = repositories::schedule::get_active_schedules(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn update_schedule(
        &self,
        organization_id: Uuid,
        id: Uuid,
        fields: &ScheduleFields,
    ) -> Result<Option<AttendanceSchedule>> {
        repositories::schedule::update_schedule(&self.pool, organization_id, id, fields)
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn insert_event(&self, event: &NewEvent) -> Result<InsertOutcome> {
        match repositories::event::insert_event(&self.pool, event).await? {
            Some(row) => Ok(InsertOutcome::Created(row.try_into()?)),
            None => Ok(InsertOutcome::AlreadyExists),
        }
    }

    async fn find_event_for_schedule_date(
        &self,
        schedule_id: Uuid,
        event_date_local: NaiveDate,
    ) -> Result<Option<AttendanceEvent>> {
        repositories::event::get_event_by_schedule_and_date(&self.pool, schedule_id, event_date_local)
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn find_event(&self, organization_id: Uuid, id: Uuid) -> Result<Option<AttendanceEvent>> {
        repositories::event::get_event_by_id(&self.pool, organization_id, id)
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn latest_open_event(&self, organization_id: Uuid) -> Result<Option<AttendanceEvent>> {
        repositories::event::get_latest_open_event(&self.pool, organization_id)
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn latest_event_since(
        &self,
        organization_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Option<AttendanceEvent>> {
        repositories::event::get_latest_event_since(&self.pool, organization_id, since)
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn upsert_record(
        &self,
        event_id: Uuid,
        person_id: Uuid,
        present: bool,
        note: Option<&str>,
        marked_by: &str,
        marked_at: DateTime<Utc>,
    ) -> Result<AttendanceRecord> {
        let row = repositories::record::upsert_record(
            &self.pool, event_id, person_id, present, note, marked_by, marked_at,
        )
        .await?;
        Ok(row.into())
    }

    async fn list_records(&self, event_id: Uuid) -> Result<Vec<AttendanceRecord>> {
        let rows = repositories::record::get_records_by_event_id(&self.pool, event_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_guest(&self, guest: &NewGuest) -> Result<AttendanceGuest> {
        let row = repositories::guest::create_guest(&self.pool, guest).await?;
        Ok(row.into())
    }

    async fn list_guests(&self, event_id: Uuid) -> Result<Vec<AttendanceGuest>> {
        let rows = repositories::guest::get_guests_by_event_id(&self.pool, event_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_active_groups(&self, organization_id: Uuid) -> Result<Vec<SmallGroup>> {
        let rows = repositories::group::get_active_groups(&self.pool, organization_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_groups_led_by(&self, organization_id: Uuid, identity: &str) -> Result<Vec<SmallGroup>> {
        let rows = repositories::group::get_groups_led_by(&self.pool, organization_id, identity).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_active_group_leaders(&self, organization_id: Uuid) -> Result<Vec<GroupLeader>> {
        let rows = repositories::group::get_active_group_leaders(&self.pool, organization_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_notification(&self, notification: &NewNotification) -> Result<Notification> {
        let row = repositories::notification::create_notification(&self.pool, notification).await?;
        Ok(row.into())
    }

    async fn list_notifications(&self, organization_id: Uuid, recipient: &str) -> Result<Vec<Notification>> {
        let rows =
            repositories::notification::get_notifications_for_recipient(&self.pool, organization_id, recipient)
                .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn mark_notification_read(
        &self,
        organization_id: Uuid,
        recipient: &str,
        id: Uuid,
        read_at: DateTime<Utc>,
    ) -> Result<Option<Notification>> {
        let row = repositories::notification::mark_notification_read(
            &self.pool,
            organization_id,
            recipient,
            id,
            read_at,
        )
        .await?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl RosterDirectory for PgStore {
    async fn list_members(&self, organization_id: Uuid, group_ids: Option<&[Uuid]>) -> Result<Vec<Person>> {
        let rows = repositories::group::get_members(&self.pool, organization_id, group_ids).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl SessionGateway for PgStore {
    async fn resolve_caller(&self, token: &str) -> Result<Option<Caller>> {
        repositories::session::get_session_by_token(&self.pool, token)
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn permission_overrides(&self, organization_id: Uuid) -> Result<PermissionOverrides> {
        let rows = repositories::session::get_permission_overrides(&self.pool, organization_id).await?;

        let mut overrides = PermissionOverrides::new();
        for row in rows {
            // Rows naming an unknown module, role or level are ignored.
            let (Ok(module), Ok(role), Ok(level)) = (
                row.module.parse::<Module>(),
                row.role.parse::<Role>(),
                row.level.parse::<PermissionLevel>(),
            ) else {
                tracing::warn!(
                    "Ignoring permission override {}/{}={} for organization {}",
                    row.module, row.role, row.level, organization_id
                );
                continue;
            };
            overrides.entry(module).or_default().insert(role, level);
        }

        Ok(overrides)
    }
}
