use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_NOTE_LEN: usize = 1000;
pub const MAX_GUEST_NAME_LEN: usize = 120;

/// One person's mark for one event. Unique per (event, person).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub event_id: Uuid,
    pub person_id: Uuid,
    pub present: bool,
    pub note: Option<String>,
    pub marked_by: String,
    pub marked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    pub person_id: Uuid,
    pub present: bool,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRecordsRequest {
    pub records: Vec<RecordInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRecordsResponse {
    pub saved: usize,
}

/// An ad hoc attendee who is not on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceGuest {
    pub id: Uuid,
    pub event_id: Uuid,
    pub group_id: Option<Uuid>,
    pub guest_name: String,
    pub note: Option<String>,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGuest {
    pub event_id: Uuid,
    pub group_id: Option<Uuid>,
    pub guest_name: String,
    pub note: Option<String>,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGuestRequest {
    pub group_id: Option<Uuid>,
    pub guest_name: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Trims a free text note, mapping blank input to `None`.
pub fn normalize_note(note: Option<&str>) -> Option<String> {
    note.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}
