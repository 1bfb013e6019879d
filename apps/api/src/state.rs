use ecclesia_application::{
    AccessService, PermissionRequestService, RecordService, RecycleBinService, UserAdminService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_service: AccessService,
    pub record_service: RecordService,
    pub permission_request_service: PermissionRequestService,
    pub recycle_bin_service: RecycleBinService,
    pub user_admin_service: UserAdminService,
    pub frontend_url: String,
    pub auth_bridge_token: String,
}
