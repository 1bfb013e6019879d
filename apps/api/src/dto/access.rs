use ecclesia_application::SectionAccess;
use ecclesia_domain::{MenuItem, Section};
use serde::Serialize;
use ts_rs::TS;

/// One navigation entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/menu-item-response.ts"
)]
pub struct MenuItemResponse {
    #[ts(
        type = "\"dashboard\" | \"section\" | \"recycle_bin\" | \"permission_requests\" | \"user_management\" | \"settings\""
    )]
    pub kind: &'static str,
    pub label: &'static str,
    pub section: Option<&'static str>,
}

impl From<MenuItem> for MenuItemResponse {
    fn from(value: MenuItem) -> Self {
        let (kind, section) = match value {
            MenuItem::Dashboard => ("dashboard", None),
            MenuItem::Section(section) => ("section", Some(section.as_str())),
            MenuItem::RecycleBin => ("recycle_bin", None),
            MenuItem::PermissionRequests => ("permission_requests", None),
            MenuItem::UserManagement => ("user_management", None),
            MenuItem::Settings => ("settings", None),
        };

        Self {
            kind,
            label: value.label(),
            section,
        }
    }
}

/// Effective access of the caller to one section.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/section-access-response.ts"
)]
pub struct SectionAccessResponse {
    pub section: &'static str,
    pub can_access: bool,
    pub can_edit: bool,
}

impl SectionAccessResponse {
    /// Builds the response for a resolved section.
    #[must_use]
    pub fn new(section: Section, access: SectionAccess) -> Self {
        Self {
            section: section.as_str(),
            can_access: access.can_access,
            can_edit: access.can_edit,
        }
    }
}
