use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::{eyre, Result};
use rollcall_core::{
    models::{
        event::{AttendanceEvent, EventStatus, InsertOutcome, NewEvent},
        group::{GroupLeader, Person, SmallGroup},
        notification::{NewNotification, Notification},
        record::{AttendanceGuest, AttendanceRecord, NewGuest},
        schedule::{AttendanceSchedule, ScheduleFields},
    },
    permissions::{Caller, Module, PermissionLevel, PermissionOverrides, Role},
};
use uuid::Uuid;

use crate::store::{AttendanceStore, RosterDirectory, SessionGateway};

#[derive(Default)]
struct State {
    schedules: Vec<AttendanceSchedule>,
    events: Vec<AttendanceEvent>,
    records: Vec<AttendanceRecord>,
    guests: Vec<AttendanceGuest>,
    groups: Vec<SmallGroup>,
    people: Vec<(Uuid, Person)>,
    contacts: HashMap<(Uuid, String), GroupLeader>,
    sessions: HashMap<String, Caller>,
    overrides: HashMap<Uuid, PermissionOverrides>,
    notifications: Vec<Notification>,
    failing_schedules: HashSet<Uuid>,
    stalled_leader_lookup: bool,
    stalled_notifications: bool,
}

/// A process local store enforcing the same uniqueness rules as the
/// PostgreSQL schema: one event per (schedule, local date) and one record per
/// (event, person).
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_group(&self, organization_id: Uuid, name: &str, leader_ids: &[&str]) -> SmallGroup {
        self.insert_group(organization_id, name, leader_ids, true)
    }

    pub fn add_inactive_group(&self, organization_id: Uuid, name: &str, leader_ids: &[&str]) -> SmallGroup {
        self.insert_group(organization_id, name, leader_ids, false)
    }

    fn insert_group(&self, organization_id: Uuid, name: &str, leader_ids: &[&str], active: bool) -> SmallGroup {
        let group = SmallGroup {
            id: Uuid::new_v4(),
            organization_id,
            name: name.to_string(),
            track: None,
            section: None,
            active,
            leader_ids: leader_ids.iter().map(|l| l.to_string()).collect(),
        };
        self.state().groups.push(group.clone());
        group
    }

    pub fn add_person(&self, organization_id: Uuid, name: &str, group_id: Option<Uuid>) -> Person {
        let person = Person {
            id: Uuid::new_v4(),
            name: name.to_string(),
            group_id,
        };
        self.state().people.push((organization_id, person.clone()));
        person
    }

    pub fn add_contact(&self, organization_id: Uuid, identity: &str, name: Option<&str>, email: Option<&str>) {
        self.state().contacts.insert(
            (organization_id, identity.to_string()),
            GroupLeader {
                identity: identity.to_string(),
                name: name.map(str::to_string),
                email: email.map(str::to_string),
            },
        );
    }

    pub fn add_session(&self, token: &str, caller: Caller) {
        self.state().sessions.insert(token.to_string(), caller);
    }

    pub fn set_override(&self, organization_id: Uuid, module: Module, role: Role, level: PermissionLevel) {
        self.state()
            .overrides
            .entry(organization_id)
            .or_default()
            .entry(module)
            .or_default()
            .insert(role, level);
    }

    /// Makes every event read or write for `schedule_id` fail.
    pub fn fail_schedule(&self, schedule_id: Uuid) {
        self.state().failing_schedules.insert(schedule_id);
    }

    /// Leader lookups never complete from now on.
    pub fn stall_leader_lookup(&self) {
        self.state().stalled_leader_lookup = true;
    }

    /// Notification inserts never complete from now on.
    pub fn stall_notifications(&self) {
        self.state().stalled_notifications = true;
    }

    /// Stores an event as is, bypassing the opener. Used to seed history.
    pub fn seed_event(&self, event: AttendanceEvent) {
        self.state().events.push(event);
    }

    pub fn events(&self) -> Vec<AttendanceEvent> {
        self.state().events.clone()
    }

    pub fn records(&self) -> Vec<AttendanceRecord> {
        self.state().records.clone()
    }

    pub fn guests(&self) -> Vec<AttendanceGuest> {
        self.state().guests.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state().notifications.clone()
    }
}

fn latest_by_opened_at<'a>(events: impl Iterator<Item = &'a AttendanceEvent>) -> Option<AttendanceEvent> {
    events.max_by_key(|e| e.opened_at).cloned()
}

#[async_trait]
impl AttendanceStore for InMemoryStore {
    async fn create_schedule(&self, organization_id: Uuid, fields: &ScheduleFields) -> Result<AttendanceSchedule> {
        let schedule = AttendanceSchedule {
            id: Uuid::new_v4(),
            organization_id,
            weekday: fields.weekday,
            start_time_local: fields.start_time_local.clone(),
            timezone: fields.timezone.clone(),
            active: fields.active,
            created_at: Utc::now(),
        };
        self.state().schedules.push(schedule.clone());
        Ok(schedule)
    }

    async fn find_schedule(&self, organization_id: Uuid, id: Uuid) -> Result<Option<AttendanceSchedule>> {
        Ok(self
            .state()
            .schedules
            .iter()
            .find(|s| s.id == id && s.organization_id == organization_id)
            .cloned())
    }

    async fn list_schedules(&self, organization_id: Uuid) -> Result<Vec<AttendanceSchedule>> {
        let mut schedules: Vec<_> = self
            .state()
            .schedules
            .iter()
            .filter(|s| s.organization_id == organization_id)
            .cloned()
            .collect();
        schedules.sort_by(|a, b| (a.weekday, &a.start_time_local).cmp(&(b.weekday, &b.start_time_local)));
        Ok(schedules)
    }

    async fn list_active_schedules(&self) -> Result<Vec<AttendanceSchedule>> {
        Ok(self.state().schedules.iter().filter(|s| s.active).cloned().collect())
    }

    async fn update_schedule(
        &self,
        organization_id: Uuid,
        id: Uuid,
        fields: &ScheduleFields,
    ) -> Result<Option<AttendanceSchedule>> {
        let mut state = self.state();
        let Some(schedule) = state
            .schedules
            .iter_mut()
            .find(|s| s.id == id && s.organization_id == organization_id)
        else {
            return Ok(None);
        };

        schedule.weekday = fields.weekday;
        schedule.start_time_local = fields.start_time_local.clone();
        schedule.timezone = fields.timezone.clone();
        schedule.active = fields.active;
        Ok(Some(schedule.clone()))
    }

    async fn insert_event(&self, event: &NewEvent) -> Result<InsertOutcome> {
        let mut state = self.state();

        if let Some(schedule_id) = event.schedule_id {
            if state.failing_schedules.contains(&schedule_id) {
                return Err(eyre!("insert failed for schedule {}", schedule_id));
            }
            let exists = state
                .events
                .iter()
                .any(|e| e.schedule_id == Some(schedule_id) && e.event_date_local == event.event_date_local);
            if exists {
                return Ok(InsertOutcome::AlreadyExists);
            }
        }

        let created = AttendanceEvent {
            id: Uuid::new_v4(),
            organization_id: event.organization_id,
            schedule_id: event.schedule_id,
            event_date_local: event.event_date_local,
            starts_at: event.starts_at,
            status: EventStatus::Open,
            opened_at: event.opened_at,
            created_by_system: event.created_by_system,
        };
        state.events.push(created.clone());
        Ok(InsertOutcome::Created(created))
    }

    async fn find_event_for_schedule_date(
        &self,
        schedule_id: Uuid,
        event_date_local: NaiveDate,
    ) -> Result<Option<AttendanceEvent>> {
        let state = self.state();
        if state.failing_schedules.contains(&schedule_id) {
            return Err(eyre!("lookup failed for schedule {}", schedule_id));
        }
        Ok(state
            .events
            .iter()
            .find(|e| e.schedule_id == Some(schedule_id) && e.event_date_local == event_date_local)
            .cloned())
    }

    async fn find_event(&self, organization_id: Uuid, id: Uuid) -> Result<Option<AttendanceEvent>> {
        Ok(self
            .state()
            .events
            .iter()
            .find(|e| e.id == id && e.organization_id == organization_id)
            .cloned())
    }

    async fn latest_open_event(&self, organization_id: Uuid) -> Result<Option<AttendanceEvent>> {
        let state = self.state();
        Ok(latest_by_opened_at(
            state
                .events
                .iter()
                .filter(|e| e.organization_id == organization_id && e.status == EventStatus::Open),
        ))
    }

    async fn latest_event_since(
        &self,
        organization_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Option<AttendanceEvent>> {
        let state = self.state();
        Ok(latest_by_opened_at(
            state
                .events
                .iter()
                .filter(|e| e.organization_id == organization_id && e.opened_at >= since),
        ))
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
        let record = AttendanceRecord {
            event_id,
            person_id,
            present,
            note: note.map(str::to_string),
            marked_by: marked_by.to_string(),
            marked_at,
        };

        let mut state = self.state();
        match state
            .records
            .iter()
            .position(|r| r.event_id == event_id && r.person_id == person_id)
        {
            Some(index) => state.records[index] = record.clone(),
            None => state.records.push(record.clone()),
        }
        Ok(record)
    }

    async fn list_records(&self, event_id: Uuid) -> Result<Vec<AttendanceRecord>> {
        Ok(self.state().records.iter().filter(|r| r.event_id == event_id).cloned().collect())
    }

    async fn insert_guest(&self, guest: &NewGuest) -> Result<AttendanceGuest> {
        let created = AttendanceGuest {
            id: Uuid::new_v4(),
            event_id: guest.event_id,
            group_id: guest.group_id,
            guest_name: guest.guest_name.clone(),
            note: guest.note.clone(),
            added_by: guest.added_by.clone(),
            created_at: guest.created_at,
        };
        self.state().guests.push(created.clone());
        Ok(created)
    }

    async fn list_guests(&self, event_id: Uuid) -> Result<Vec<AttendanceGuest>> {
        Ok(self.state().guests.iter().filter(|g| g.event_id == event_id).cloned().collect())
    }

    async fn list_active_groups(&self, organization_id: Uuid) -> Result<Vec<SmallGroup>> {
        let mut groups: Vec<_> = self
            .state()
            .groups
            .iter()
            .filter(|g| g.organization_id == organization_id && g.active)
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn list_groups_led_by(&self, organization_id: Uuid, identity: &str) -> Result<Vec<SmallGroup>> {
        let groups = self.list_active_groups(organization_id).await?;
        Ok(groups
            .into_iter()
            .filter(|g| g.leader_ids.iter().any(|l| l == identity))
            .collect())
    }

    async fn list_active_group_leaders(&self, organization_id: Uuid) -> Result<Vec<GroupLeader>> {
        let stalled = self.state().stalled_leader_lookup;
        if stalled {
            std::future::pending::<()>().await;
        }

        let state = self.state();
        let mut leaders = BTreeMap::new();
        for group in state
            .groups
            .iter()
            .filter(|g| g.organization_id == organization_id && g.active)
        {
            for identity in &group.leader_ids {
                let leader = state
                    .contacts
                    .get(&(organization_id, identity.clone()))
                    .cloned()
                    .unwrap_or_else(|| GroupLeader {
                        identity: identity.clone(),
                        name: None,
                        email: None,
                    });
                leaders.insert(identity.clone(), leader);
            }
        }
        Ok(leaders.into_values().collect())
    }

    async fn insert_notification(&self, notification: &NewNotification) -> Result<Notification> {
        let stalled = self.state().stalled_notifications;
        if stalled {
            std::future::pending::<()>().await;
        }

        let created = Notification {
            id: Uuid::new_v4(),
            organization_id: notification.organization_id,
            recipient: notification.recipient.clone(),
            kind: notification.kind.clone(),
            title: notification.title.clone(),
            body: notification.body.clone(),
            action_link: notification.action_link.clone(),
            created_at: notification.created_at,
            read_at: None,
        };
        self.state().notifications.push(created.clone());
        Ok(created)
    }

    async fn list_notifications(&self, organization_id: Uuid, recipient: &str) -> Result<Vec<Notification>> {
        let mut notifications: Vec<_> = self
            .state()
            .notifications
            .iter()
            .filter(|n| n.organization_id == organization_id && n.recipient == recipient)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn mark_notification_read(
        &self,
        organization_id: Uuid,
        recipient: &str,
        id: Uuid,
        read_at: DateTime<Utc>,
    ) -> Result<Option<Notification>> {
        let mut state = self.state();
        let Some(notification) = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.organization_id == organization_id && n.recipient == recipient)
        else {
            return Ok(None);
        };

        notification.read_at.get_or_insert(read_at);
        Ok(Some(notification.clone()))
    }
}

#[async_trait]
impl RosterDirectory for InMemoryStore {
    async fn list_members(&self, organization_id: Uuid, group_ids: Option<&[Uuid]>) -> Result<Vec<Person>> {
        let mut members: Vec<_> = self
            .state()
            .people
            .iter()
            .filter(|(org, _)| *org == organization_id)
            .filter(|(_, p)| match group_ids {
                Some(ids) => p.group_id.is_some_and(|g| ids.contains(&g)),
                None => true,
            })
            .map(|(_, p)| p.clone())
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(members)
    }
}

#[async_trait]
impl SessionGateway for InMemoryStore {
    async fn resolve_caller(&self, token: &str) -> Result<Option<Caller>> {
        Ok(self.state().sessions.get(token).cloned())
    }

    async fn permission_overrides(&self, organization_id: Uuid) -> Result<PermissionOverrides> {
        Ok(self.state().overrides.get(&organization_id).cloned().unwrap_or_default())
    }
}
