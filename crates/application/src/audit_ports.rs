use async_trait::async_trait;
use ecclesia_core::AppResult;
use ecclesia_domain::AuditAction;

/// Audit event payload written by application services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Acting subject.
    pub subject: String,
    /// Stable action identifier.
    pub action: AuditAction,
    /// Resource type the action touched.
    pub resource_type: String,
    /// Resource identifier the action touched.
    pub resource_id: String,
    /// Optional free-text detail.
    pub detail: Option<String>,
}

/// Repository port for append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}

/// Audit log entry projection for administrative views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    /// Stable event identifier.
    pub event_id: String,
    /// Actor subject.
    pub subject: String,
    /// Stable action identifier.
    pub action: String,
    /// Event resource type.
    pub resource_type: String,
    /// Event resource identifier.
    pub resource_id: String,
    /// Optional event detail.
    pub detail: Option<String>,
    /// Event timestamp in RFC3339.
    pub created_at: String,
}

/// Query parameters for audit log listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Optional action filter.
    pub action: Option<String>,
    /// Optional subject filter.
    pub subject: Option<String>,
}

/// Repository port for reading the audit log.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Lists most recent audit entries.
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>>;
}
