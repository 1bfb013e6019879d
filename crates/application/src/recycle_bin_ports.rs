use async_trait::async_trait;
use ecclesia_core::AppResult;
use ecclesia_domain::{ChurchRecord, RecycleBinItem, UserProfile};

/// Query parameters for recycle-bin listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecycleBinQuery {
    /// Optional stored type tag filter.
    pub entity_type: Option<String>,
    /// Maximum rows returned; `None` returns everything.
    pub limit: Option<usize>,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

/// Repository port for soft-delete envelopes.
#[async_trait]
pub trait RecycleBinRepository: Send + Sync {
    /// Persists a new envelope.
    async fn insert_item(&self, item: RecycleBinItem) -> AppResult<()>;

    /// Lists envelopes, newest first.
    async fn list_items(&self, query: RecycleBinQuery) -> AppResult<Vec<RecycleBinItem>>;

    /// Finds one envelope.
    async fn find_item(&self, item_id: &str) -> AppResult<Option<RecycleBinItem>>;

    /// Deletes an envelope, failing with `NotFound` when absent.
    async fn remove_item(&self, item_id: &str) -> AppResult<()>;
}

/// Entity re-inserted by a restore.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoredEntity {
    /// A church record, possibly under a new identifier.
    Record(ChurchRecord),
    /// A user account.
    User(UserProfile),
}

/// Envelope that could not be purged during `empty_bin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyBinFailure {
    /// Envelope identifier.
    pub item_id: String,
    /// Failure description.
    pub message: String,
}

/// Outcome of a best-effort `empty_bin`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmptyBinReport {
    /// Envelopes permanently deleted.
    pub removed: Vec<String>,
    /// Envelopes left behind.
    pub failed: Vec<EmptyBinFailure>,
}
