//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod access_service;
mod audit_ports;
mod permission_request_ports;
mod permission_request_service;
mod record_ports;
mod record_service;
mod recycle_bin_ports;
mod recycle_bin_service;
mod user_admin_service;

#[cfg(test)]
mod test_fakes;

pub use access_ports::{SectionAccess, UserProfileRepository};
pub use access_service::AccessService;
pub use audit_ports::{
    AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
};
pub use permission_request_ports::{
    PermissionRequestQuery, PermissionRequestRepository, SubmitPermissionRequestInput,
};
pub use permission_request_service::PermissionRequestService;
pub use record_ports::{AttendanceEntry, NewRecord, RecordListQuery, RecordRepository};
pub use record_service::RecordService;
pub use recycle_bin_ports::{
    EmptyBinFailure, EmptyBinReport, RecycleBinQuery, RecycleBinRepository, RestoredEntity,
};
pub use recycle_bin_service::RecycleBinService;
pub use user_admin_service::{UpdateUserAccessInput, UserAdminService};
