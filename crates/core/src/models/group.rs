use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The unit that scopes roster visibility and notification recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmallGroup {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub track: Option<String>,
    pub section: Option<String>,
    pub active: bool,
    pub leader_ids: Vec<String>,
}

/// A roster member as served by the roster directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub group_id: Option<Uuid>,
}

/// A leader of at least one active group, with where to reach them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupLeader {
    pub identity: String,
    pub name: Option<String>,
    pub email: Option<String>,
}
