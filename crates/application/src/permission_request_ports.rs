use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ecclesia_core::AppResult;
use ecclesia_domain::{EntityType, PermissionRequest, RequestStatus, RequestType};

/// Input payload for submitting a permission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitPermissionRequestInput {
    /// Requested change.
    pub request_type: RequestType,
    /// Entity type of the target record.
    pub data_type: EntityType,
    /// Target record identifier.
    pub data_id: String,
    /// Justification.
    pub reason: String,
}

/// Query parameters for permission request listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequestQuery {
    /// Optional requester filter.
    pub requester_id: Option<String>,
    /// Optional stored status filter.
    pub status: Option<RequestStatus>,
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

/// Repository port for permission requests.
#[async_trait]
pub trait PermissionRequestRepository: Send + Sync {
    /// Persists a new request.
    async fn insert_request(&self, request: PermissionRequest) -> AppResult<()>;

    /// Finds one request.
    async fn find_request(&self, request_id: &str) -> AppResult<Option<PermissionRequest>>;

    /// Lists requests, newest first.
    async fn list_requests(&self, query: PermissionRequestQuery)
    -> AppResult<Vec<PermissionRequest>>;

    /// Stores a review outcome.
    ///
    /// Fails with `Conflict` unless the stored request is still pending.
    async fn save_review(&self, request: &PermissionRequest) -> AppResult<()>;

    /// Finds an approved, unexpired request granting the given change.
    async fn find_active_grant(
        &self,
        requester_id: &str,
        request_type: RequestType,
        data_type: EntityType,
        data_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<PermissionRequest>>;

    /// Marks approved requests whose window has elapsed as expired.
    ///
    /// Returns the number of requests changed.
    async fn expire_elapsed(&self, now: DateTime<Utc>) -> AppResult<u64>;
}
