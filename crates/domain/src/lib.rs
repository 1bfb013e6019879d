//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod audit;
mod permission_request;
mod record;
mod recycle_bin;
mod role;
mod section;
mod user;

pub use access::{
    ModificationDecision, accessible_menu_items, can_access_section, can_administer,
    can_edit_data, can_manage_data_personnel, can_manage_users, modification_decision,
};
pub use audit::AuditAction;
pub use permission_request::{
    GRANT_WINDOW_HOURS, PermissionRequest, RequestStatus, RequestTarget, RequestType,
};
pub use record::{
    AttendanceStatus, ChurchRecord, EntityType, MEMBER_ID_PREFIX, RecordIdStrategy,
    format_prefixed_id, parse_attendance_date,
};
pub use recycle_bin::RecycleBinItem;
pub use role::{PermissionLevel, Role, RoleCapabilities};
pub use section::{MenuItem, Section, SectionModule};
pub use user::{EmailAddress, UserProfile};
