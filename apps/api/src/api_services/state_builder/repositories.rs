use std::sync::Arc;

use ecclesia_infrastructure::{
    PostgresAuditLogRepository, PostgresAuditRepository, PostgresPermissionRequestRepository,
    PostgresRecordRepository, PostgresRecycleBinRepository, PostgresUserProfileRepository,
};
use sqlx::PgPool;

pub(super) struct RepositorySet {
    pub(super) user_profile_repository: Arc<PostgresUserProfileRepository>,
    pub(super) record_repository: Arc<PostgresRecordRepository>,
    pub(super) recycle_bin_repository: Arc<PostgresRecycleBinRepository>,
    pub(super) permission_request_repository: Arc<PostgresPermissionRequestRepository>,
    pub(super) audit_repository: Arc<PostgresAuditRepository>,
    pub(super) audit_log_repository: Arc<PostgresAuditLogRepository>,
}

pub(super) fn build_repository_set(pool: &PgPool) -> RepositorySet {
    RepositorySet {
        user_profile_repository: Arc::new(PostgresUserProfileRepository::new(pool.clone())),
        record_repository: Arc::new(PostgresRecordRepository::new(pool.clone())),
        recycle_bin_repository: Arc::new(PostgresRecycleBinRepository::new(pool.clone())),
        permission_request_repository: Arc::new(PostgresPermissionRequestRepository::new(
            pool.clone(),
        )),
        audit_repository: Arc::new(PostgresAuditRepository::new(pool.clone())),
        audit_log_repository: Arc::new(PostgresAuditLogRepository::new(pool.clone())),
    }
}
