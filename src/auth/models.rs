use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Administrator roles.
///
/// The order of variants matters: `SuperAdmin` ranks above `Admin`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Standard administrator: manages content, pages and their own profile.
    #[default]
    Admin,
    /// Elevated administrator: additionally manages other administrators.
    SuperAdmin,
}

/// Actions gated on role at the handler boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create or deactivate administrators, and edit any administrator.
    ManageAdmins,
    /// Change an administrator's role or active flag.
    ChangeRoles,
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminRole::Admin => write!(f, "admin"),
            AdminRole::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

impl AdminRole {
    /// Parse a role from its wire name (case-insensitive).
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(AdminRole::Admin),
            "super_admin" => Some(AdminRole::SuperAdmin),
            _ => None,
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManageAdmins | Capability::ChangeRoles => *self == AdminRole::SuperAdmin,
        }
    }
}

/// The administrator identity carried by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAdmin {
    pub id: ObjectId,
    pub email: String,
    pub role: AdminRole,
}

impl AuthenticatedAdmin {
    pub fn can(&self, capability: Capability) -> bool {
        self.role.can(capability)
    }
}
