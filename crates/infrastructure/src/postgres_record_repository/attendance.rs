use chrono::{DateTime, NaiveDate, Utc};
use ecclesia_application::{AttendanceEntry, NewRecord, RecordRepository};
use ecclesia_core::{AppError, AppResult};
use ecclesia_domain::{ChurchRecord, EntityType};
use serde_json::json;

use super::{PostgresRecordRepository, RecordRow};

impl PostgresRecordRepository {
    pub(super) async fn find_attendance_row(
        &self,
        member_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<ChurchRecord>> {
        let date = date.format("%Y-%m-%d").to_string();
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT entity_type, record_id, data, created_by, created_at, updated_at
            FROM church_records
            WHERE entity_type = $1
                AND data ->> 'member_id' = $2
                AND data ->> 'date' = $3
            "#,
        )
        .bind(EntityType::AttendanceRecord.as_str())
        .bind(member_id)
        .bind(date.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find attendance for '{member_id}' on {date}: {error}"
            ))
        })?;

        row.map(ChurchRecord::try_from).transpose()
    }

    /// Writes the attendance row keyed by member and date.
    ///
    /// An existing row keeps its identifier and creator; only the mark changes.
    pub(super) async fn upsert_attendance_row(
        &self,
        date: NaiveDate,
        entry: AttendanceEntry,
        recorded_by: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ChurchRecord> {
        let existing_id = self
            .find_attendance_row(&entry.member_id, date)
            .await?
            .map(|record| record.record_id().to_owned());
        let data = json!({
            "member_id": entry.member_id.as_str(),
            "date": date.format("%Y-%m-%d").to_string(),
            "status": entry.status.as_str(),
        });

        match existing_id {
            Some(record_id) => {
                self.update_record(EntityType::AttendanceRecord, &record_id, data, now)
                    .await
            }
            None => {
                self.insert_record(NewRecord {
                    entity_type: EntityType::AttendanceRecord,
                    record_id: None,
                    data,
                    created_by: recorded_by.to_owned(),
                    created_at: now,
                })
                .await
            }
        }
    }
}
