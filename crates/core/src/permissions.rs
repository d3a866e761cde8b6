//! Role based module permissions.
//!
//! Every caller carries an organization role. The level a role has on a module
//! is resolved in two steps: the organization's override map, then the fixed
//! [`DEFAULT_MATRIX`], then [`PermissionLevel::None`].

use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    None,
    View,
    Edit,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Module {
    Roster,
    Activity,
    BrainDump,
    Attendance,
    HangoutNotes,
    Adminland,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Pending,
    Approved,
    Leader,
    Admin,
    Viewer,
    Demo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Pending,
    Approved,
    Suspended,
}

/// The identity behind a request, as resolved by the session gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub identity: String,
    pub organization_id: Uuid,
    pub role: Role,
    pub status: MemberStatus,
    pub name: Option<String>,
}

/// Organization specific levels layered over the defaults.
pub type PermissionOverrides = HashMap<Module, HashMap<Role, PermissionLevel>>;

use PermissionLevel as L;

pub const DEFAULT_MATRIX: &[(Module, &[(Role, PermissionLevel)])] = &[
    (
        Module::Roster,
        &[
            (Role::Pending, L::View),
            (Role::Approved, L::Edit),
            (Role::Leader, L::Edit),
            (Role::Admin, L::Admin),
            (Role::Demo, L::View),
            (Role::Viewer, L::View),
        ],
    ),
    (
        Module::Activity,
        &[
            (Role::Pending, L::View),
            (Role::Approved, L::View),
            (Role::Leader, L::Edit),
            (Role::Admin, L::Admin),
            (Role::Demo, L::View),
            (Role::Viewer, L::View),
        ],
    ),
    (
        Module::BrainDump,
        &[
            (Role::Pending, L::None),
            (Role::Approved, L::Edit),
            (Role::Leader, L::Edit),
            (Role::Admin, L::Admin),
            (Role::Demo, L::None),
            (Role::Viewer, L::None),
        ],
    ),
    (
        Module::Attendance,
        &[
            (Role::Pending, L::View),
            (Role::Approved, L::Edit),
            (Role::Leader, L::Edit),
            (Role::Admin, L::Admin),
            (Role::Demo, L::View),
            (Role::Viewer, L::View),
        ],
    ),
    (
        Module::HangoutNotes,
        &[
            (Role::Pending, L::None),
            (Role::Approved, L::Edit),
            (Role::Leader, L::Edit),
            (Role::Admin, L::Admin),
            (Role::Demo, L::View),
            (Role::Viewer, L::None),
        ],
    ),
    (
        Module::Adminland,
        &[
            (Role::Pending, L::None),
            (Role::Approved, L::None),
            (Role::Leader, L::None),
            (Role::Admin, L::Admin),
            (Role::Demo, L::None),
            (Role::Viewer, L::None),
        ],
    ),
    (
        Module::Dashboard,
        &[
            (Role::Pending, L::View),
            (Role::Approved, L::View),
            (Role::Leader, L::View),
            (Role::Admin, L::Admin),
            (Role::Demo, L::View),
            (Role::Viewer, L::View),
        ],
    ),
];

fn default_level(module: Module, role: Role) -> Option<PermissionLevel> {
    DEFAULT_MATRIX
        .iter()
        .find(|(m, _)| *m == module)
        .and_then(|(_, levels)| levels.iter().find(|(r, _)| *r == role))
        .map(|(_, level)| *level)
}

pub fn resolve_level(overrides: &PermissionOverrides, module: Module, role: Role) -> PermissionLevel {
    overrides
        .get(&module)
        .and_then(|roles| roles.get(&role))
        .copied()
        .or_else(|| default_level(module, role))
        .unwrap_or(PermissionLevel::None)
}

pub fn has_permission(
    caller: &Caller,
    module: Module,
    required: PermissionLevel,
    overrides: &PermissionOverrides,
) -> bool {
    if caller.role == Role::Admin {
        return true;
    }
    if caller.role == Role::Demo && required > PermissionLevel::View {
        return false;
    }
    if caller.status != MemberStatus::Approved && caller.role != Role::Pending {
        return false;
    }
    resolve_level(overrides, module, caller.role) >= required
}

macro_rules! string_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(format!("unknown {}: {}", stringify!($ty), other)),
                }
            }
        }
    };
}

string_enum!(PermissionLevel {
    None => "none",
    View => "view",
    Edit => "edit",
    Admin => "admin",
});

string_enum!(Module {
    Roster => "roster",
    Activity => "activity",
    BrainDump => "brainDump",
    Attendance => "attendance",
    HangoutNotes => "hangoutNotes",
    Adminland => "adminland",
    Dashboard => "dashboard",
});

string_enum!(Role {
    Pending => "pending",
    Approved => "approved",
    Leader => "leader",
    Admin => "admin",
    Viewer => "viewer",
    Demo => "demo",
});

string_enum!(MemberStatus {
    Pending => "pending",
    Approved => "approved",
    Suspended => "suspended",
});
