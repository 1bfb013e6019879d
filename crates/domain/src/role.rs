use std::str::FromStr;

use ecclesia_core::AppError;
use serde::{Deserialize, Serialize};

/// Church staff and congregation roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative control including user management.
    SuperAdmin,
    /// Access to every section without user management.
    Admin,
    /// Access restricted to individually assigned sections.
    DataPersonnel,
    /// Congregation member.
    Member,
    /// Authenticated account awaiting a role.
    Guest,
}

/// Static capabilities attached to each role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleCapabilities {
    /// Every section is reachable and editable.
    pub can_access_all: bool,
    /// May create, update, and delete user accounts.
    pub can_manage_users: bool,
    /// May assign sections to data personnel.
    pub can_manage_data_personnel: bool,
    /// Changes to data originated by others need an approved request.
    pub needs_permission_request: bool,
}

impl Role {
    /// Returns the capability row for this role.
    #[must_use]
    pub fn capabilities(self) -> RoleCapabilities {
        match self {
            Self::SuperAdmin => RoleCapabilities {
                can_access_all: true,
                can_manage_users: true,
                can_manage_data_personnel: true,
                needs_permission_request: false,
            },
            Self::Admin => RoleCapabilities {
                can_access_all: true,
                can_manage_users: false,
                can_manage_data_personnel: false,
                needs_permission_request: false,
            },
            Self::DataPersonnel | Self::Member => RoleCapabilities {
                can_access_all: false,
                can_manage_users: false,
                can_manage_data_personnel: false,
                needs_permission_request: true,
            },
            Self::Guest => RoleCapabilities {
                can_access_all: false,
                can_manage_users: false,
                can_manage_data_personnel: false,
                needs_permission_request: false,
            },
        }
    }

    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::DataPersonnel => "data_personnel",
            Self::Member => "member",
            Self::Guest => "guest",
        }
    }

    /// Returns the human-readable role label.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::Admin => "Admin",
            Self::DataPersonnel => "Data Personnel",
            Self::Member => "Member",
            Self::Guest => "Guest",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::SuperAdmin,
            Role::Admin,
            Role::DataPersonnel,
            Role::Member,
            Role::Guest,
        ];

        ALL
    }

    /// Parses a transport value into a role.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "data_personnel" => Ok(Self::DataPersonnel),
            "member" => Ok(Self::Member),
            "guest" => Ok(Self::Guest),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

/// Edit capability carried by non-administrative accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    /// Read-only access.
    Viewer,
    /// Read and write access.
    Editor,
}

impl PermissionLevel {
    /// Returns a stable storage value for this level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
        }
    }

    /// Parses a transport value into a permission level.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for PermissionLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "viewer" => Ok(Self::Viewer),
            "editor" => Ok(Self::Editor),
            _ => Err(AppError::Validation(format!(
                "unknown permission level value '{value}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{PermissionLevel, Role};

    #[test]
    fn role_roundtrip_storage_value() {
        for role in Role::all() {
            let restored = Role::from_str(role.as_str());
            assert_eq!(restored.ok(), Some(*role));
        }
    }

    #[test]
    fn only_super_admin_manages_users() {
        let managers: Vec<Role> = Role::all()
            .iter()
            .copied()
            .filter(|role| role.capabilities().can_manage_users)
            .collect();
        assert_eq!(managers, vec![Role::SuperAdmin]);
        assert!(!Role::Admin.capabilities().can_manage_data_personnel);
    }

    #[test]
    fn unknown_permission_level_is_rejected() {
        assert!(PermissionLevel::from_str("owner").is_err());
    }
}
