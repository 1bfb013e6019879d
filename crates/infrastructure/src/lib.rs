//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_record_repository;
mod postgres_audit_log_repository;
mod postgres_audit_repository;
mod postgres_permission_request_repository;
mod postgres_record_repository;
mod postgres_recycle_bin_repository;
mod postgres_user_profile_repository;

pub use in_memory_record_repository::InMemoryRecordRepository;
pub use postgres_audit_log_repository::PostgresAuditLogRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_permission_request_repository::PostgresPermissionRequestRepository;
pub use postgres_record_repository::PostgresRecordRepository;
pub use postgres_recycle_bin_repository::PostgresRecycleBinRepository;
pub use postgres_user_profile_repository::PostgresUserProfileRepository;
