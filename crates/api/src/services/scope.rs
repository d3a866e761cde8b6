use rollcall_core::{
    errors::AttendanceResult,
    models::group::SmallGroup,
    permissions::{Caller, PermissionLevel},
};
use uuid::Uuid;

use super::AttendanceContext;

/// The groups whose roster a caller may see and mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupScope {
    /// Attendance administrators: every active group of the organization.
    All(Vec<SmallGroup>),
    /// Everyone else: the active groups the caller leads.
    Led(Vec<SmallGroup>),
}

impl GroupScope {
    pub fn is_admin(&self) -> bool {
        matches!(self, GroupScope::All(_))
    }

    pub fn groups(&self) -> &[SmallGroup] {
        match self {
            GroupScope::All(groups) | GroupScope::Led(groups) => groups,
        }
    }

    pub fn group_ids(&self) -> Vec<Uuid> {
        self.groups().iter().map(|g| g.id).collect()
    }

    pub fn contains(&self, group_id: Uuid) -> bool {
        self.groups().iter().any(|g| g.id == group_id)
    }
}

pub async fn resolve_scope(ctx: &AttendanceContext, caller: &Caller) -> AttendanceResult<GroupScope> {
    if ctx.allows(caller, PermissionLevel::Admin).await? {
        let groups = ctx.store.list_active_groups(caller.organization_id).await?;
        Ok(GroupScope::All(groups))
    } else {
        let groups = ctx
            .store
            .list_groups_led_by(caller.organization_id, &caller.identity)
            .await?;
        Ok(GroupScope::Led(groups))
    }
}
