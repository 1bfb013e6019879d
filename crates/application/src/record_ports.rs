use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ecclesia_core::AppResult;
use ecclesia_domain::{AttendanceStatus, ChurchRecord, EntityType};
use serde_json::Value;

/// Record insert payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    /// Entity type of the record.
    pub entity_type: EntityType,
    /// Identifier to keep; `None` allocates one per the type's strategy.
    pub record_id: Option<String>,
    /// Record JSON object.
    pub data: Value,
    /// Creating subject.
    pub created_by: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Query parameters for record listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordListQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Case-insensitive substring filter over the record's text fields.
    pub search: Option<String>,
}

impl Default for RecordListQuery {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
            search: None,
        }
    }
}

/// One row of a batch attendance save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEntry {
    /// Member identifier.
    pub member_id: String,
    /// Attendance mark.
    pub status: AttendanceStatus,
}

/// Repository port for church records.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Lists records of one type, oldest first.
    async fn list_records(
        &self,
        entity_type: EntityType,
        query: RecordListQuery,
    ) -> AppResult<Vec<ChurchRecord>>;

    /// Finds one record.
    async fn find_record(
        &self,
        entity_type: EntityType,
        record_id: &str,
    ) -> AppResult<Option<ChurchRecord>>;

    /// Inserts a record, failing with `Conflict` when the identifier is taken.
    async fn insert_record(&self, record: NewRecord) -> AppResult<ChurchRecord>;

    /// Replaces a record's data, failing with `NotFound` when absent.
    async fn update_record(
        &self,
        entity_type: EntityType,
        record_id: &str,
        data: Value,
        updated_at: DateTime<Utc>,
    ) -> AppResult<ChurchRecord>;

    /// Deletes a record, failing with `NotFound` when absent.
    async fn delete_record(&self, entity_type: EntityType, record_id: &str) -> AppResult<()>;

    /// Finds the attendance row for a member on a date, if one exists.
    async fn find_attendance(
        &self,
        member_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<ChurchRecord>>;

    /// Inserts or updates the attendance row keyed by member and date.
    async fn upsert_attendance(
        &self,
        date: NaiveDate,
        entry: AttendanceEntry,
        recorded_by: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ChurchRecord>;
}
