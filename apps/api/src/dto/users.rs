use std::collections::BTreeSet;

use ecclesia_application::{AuditLogEntry, UpdateUserAccessInput};
use ecclesia_core::AppResult;
use ecclesia_domain::{PermissionLevel, Role, Section, UserProfile};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// API representation of a stored user profile.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-profile-response.ts"
)]
pub struct UserProfileResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    #[ts(type = "\"super_admin\" | \"admin\" | \"data_personnel\" | \"member\" | \"guest\"")]
    pub role: &'static str,
    pub role_label: &'static str,
    #[ts(type = "\"viewer\" | \"editor\" | null")]
    pub permission_level: Option<&'static str>,
    pub assigned_sections: Vec<&'static str>,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            subject: value.subject().to_owned(),
            display_name: value.display_name().to_owned(),
            email: value.email().map(ToOwned::to_owned),
            role: value.role().as_str(),
            role_label: value.role().display_name(),
            permission_level: value.permission_level().map(|level| level.as_str()),
            assigned_sections: value
                .assigned_sections()
                .iter()
                .map(|section| section.as_str())
                .collect(),
        }
    }
}

/// Incoming payload for changing a user's role, level and sections.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-user-access-request.ts"
)]
pub struct UpdateUserAccessRequest {
    pub role: String,
    pub permission_level: Option<String>,
    #[serde(default)]
    pub assigned_sections: Vec<String>,
}

impl UpdateUserAccessRequest {
    /// Parses transport values into the service input.
    pub fn into_input(self) -> AppResult<UpdateUserAccessInput> {
        let assigned_sections = self
            .assigned_sections
            .iter()
            .map(|section| Section::from_transport(section.as_str()))
            .collect::<AppResult<BTreeSet<_>>>()?;

        Ok(UpdateUserAccessInput {
            role: Role::from_transport(self.role.as_str())?,
            permission_level: self
                .permission_level
                .as_deref()
                .map(PermissionLevel::from_transport)
                .transpose()?,
            assigned_sections,
        })
    }
}

/// API representation of one audit entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/audit-log-entry-response.ts"
)]
pub struct AuditLogEntryResponse {
    pub event_id: String,
    pub subject: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub detail: Option<String>,
    pub created_at: String,
}

impl From<AuditLogEntry> for AuditLogEntryResponse {
    fn from(value: AuditLogEntry) -> Self {
        Self {
            event_id: value.event_id,
            subject: value.subject,
            action: value.action,
            resource_type: value.resource_type,
            resource_id: value.resource_id,
            detail: value.detail,
            created_at: value.created_at,
        }
    }
}
