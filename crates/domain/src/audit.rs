use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a record is created.
    RecordCreated,
    /// Emitted when a record is updated.
    RecordUpdated,
    /// Emitted when a record or account is moved to the recycle bin.
    RecordDeleted,
    /// Emitted when an envelope is restored to its origin store.
    RecycleBinRestored,
    /// Emitted when an envelope is permanently deleted.
    RecycleBinPurged,
    /// Emitted when a permission request is submitted.
    PermissionRequested,
    /// Emitted when a permission request is approved.
    PermissionApproved,
    /// Emitted when a permission request is denied.
    PermissionDenied,
    /// Emitted when an approved request authorizes a change.
    PermissionGrantUsed,
    /// Emitted when a user's role, level, or sections change.
    UserAccessUpdated,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecordCreated => "record.created",
            Self::RecordUpdated => "record.updated",
            Self::RecordDeleted => "record.deleted",
            Self::RecycleBinRestored => "recycle_bin.restored",
            Self::RecycleBinPurged => "recycle_bin.purged",
            Self::PermissionRequested => "permission.requested",
            Self::PermissionApproved => "permission.approved",
            Self::PermissionDenied => "permission.denied",
            Self::PermissionGrantUsed => "permission.grant_used",
            Self::UserAccessUpdated => "user.access_updated",
        }
    }
}
