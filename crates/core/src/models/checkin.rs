use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::AttendanceEvent;

/// What a caller sees when opening check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinView {
    pub event: Option<AttendanceEvent>,
    pub groups: Vec<CheckinGroup>,
}

impl CheckinView {
    pub fn empty() -> Self {
        Self {
            event: None,
            groups: Vec::new(),
        }
    }
}

/// Roster entries of one group. `group_id` is `None` for the unassigned bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinGroup {
    pub group_id: Option<Uuid>,
    pub name: String,
    pub entries: Vec<CheckinEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinEntry {
    pub person_id: Uuid,
    pub name: String,
    pub present: Option<bool>,
    pub note: String,
}
