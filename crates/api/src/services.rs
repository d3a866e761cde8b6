//! Attendance services.
//!
//! Handlers and the scheduler binary call into these. Storage is reached only
//! through the traits in [`rollcall_db::store`], so the same code runs against
//! PostgreSQL and the in-memory store.

pub mod checkin;
pub mod dispatcher;
pub mod events;
pub mod notifications;
pub mod opener;
pub mod records;
pub mod schedules;
pub mod scope;

use std::sync::Arc;

use rollcall_core::{
    errors::{AttendanceError, AttendanceResult},
    permissions::{Caller, Module, PermissionLevel},
};
use rollcall_db::store::{AttendanceStore, RosterDirectory, SessionGateway};

/// The collaborators every user-facing attendance operation needs.
#[derive(Clone)]
pub struct AttendanceContext {
    pub store: Arc<dyn AttendanceStore>,
    pub roster: Arc<dyn RosterDirectory>,
    pub gateway: Arc<dyn SessionGateway>,
}

impl AttendanceContext {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        roster: Arc<dyn RosterDirectory>,
        gateway: Arc<dyn SessionGateway>,
    ) -> Self {
        Self {
            store,
            roster,
            gateway,
        }
    }

    /// Uses one backend for all three seams.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: AttendanceStore + RosterDirectory + SessionGateway + 'static,
    {
        Self {
            store: backend.clone(),
            roster: backend.clone(),
            gateway: backend,
        }
    }

    pub async fn allows(&self, caller: &Caller, level: PermissionLevel) -> AttendanceResult<bool> {
        Ok(self
            .gateway
            .has_permission(caller, Module::Attendance, level)
            .await?)
    }

    /// Fails with an authorization error unless `caller` holds `level` on attendance.
    pub async fn require(&self, caller: &Caller, level: PermissionLevel) -> AttendanceResult<()> {
        if self.allows(caller, level).await? {
            Ok(())
        } else {
            Err(AttendanceError::Authorization(format!(
                "{} access to attendance required",
                level
            )))
        }
    }
}
