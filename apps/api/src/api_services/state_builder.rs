use ecclesia_application::{
    AccessService, PermissionRequestService, RecordService, RecycleBinService, UserAdminService,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

mod repositories;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> AppState {
    let repositories = repositories::build_repository_set(&pool);

    let access_service = AccessService::new(
        repositories.user_profile_repository.clone(),
        repositories.permission_request_repository.clone(),
        repositories.audit_repository.clone(),
    );
    let recycle_bin_service = RecycleBinService::new(
        access_service.clone(),
        repositories.recycle_bin_repository,
        repositories.record_repository.clone(),
        repositories.user_profile_repository.clone(),
        repositories.audit_repository.clone(),
    );

    AppState {
        record_service: RecordService::new(
            access_service.clone(),
            repositories.record_repository.clone(),
            recycle_bin_service.clone(),
            repositories.audit_repository.clone(),
        ),
        permission_request_service: PermissionRequestService::new(
            access_service.clone(),
            repositories.permission_request_repository,
            repositories.record_repository,
            repositories.audit_repository.clone(),
        ),
        user_admin_service: UserAdminService::new(
            access_service.clone(),
            repositories.user_profile_repository,
            recycle_bin_service.clone(),
            repositories.audit_log_repository,
            repositories.audit_repository,
        ),
        access_service,
        recycle_bin_service,
        frontend_url: config.frontend_url.clone(),
        auth_bridge_token: config.auth_bridge_token.clone(),
    }
}
