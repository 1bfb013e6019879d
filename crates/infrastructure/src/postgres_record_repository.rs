use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ecclesia_application::{AttendanceEntry, NewRecord, RecordListQuery, RecordRepository};
use ecclesia_core::{AppError, AppResult};
use ecclesia_domain::{ChurchRecord, EntityType};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

mod attendance;
mod sequences;

/// PostgreSQL-backed record store for every section-governed entity type.
#[derive(Clone)]
pub struct PostgresRecordRepository {
    pool: PgPool,
}

impl PostgresRecordRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RecordRow {
    entity_type: String,
    record_id: String,
    data: Value,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RecordRow> for ChurchRecord {
    type Error = AppError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        ChurchRecord::new(
            row.record_id,
            EntityType::from_transport(row.entity_type.as_str())?,
            row.data,
            row.created_by,
            row.created_at,
            row.updated_at,
        )
    }
}

#[async_trait]
impl RecordRepository for PostgresRecordRepository {
    async fn list_records(
        &self,
        entity_type: EntityType,
        query: RecordListQuery,
    ) -> AppResult<Vec<ChurchRecord>> {
        let capped_limit = query.limit.clamp(1, 500) as i64;
        let offset = query.offset as i64;
        let search = query
            .search
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .map(|value| escape_like(&value));

        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT entity_type, record_id, data, created_by, created_at, updated_at
            FROM church_records
            WHERE entity_type = $1
                AND (
                    $2::TEXT IS NULL
                    OR EXISTS (
                        SELECT 1
                        FROM jsonb_each_text(data) AS field(key, value)
                        WHERE jsonb_typeof(data -> field.key) = 'string'
                            AND field.value ILIKE '%' || $2 || '%' ESCAPE '\'
                    )
                )
            ORDER BY created_at, record_id
            LIMIT $3
            OFFSET $4
            "#,
        )
        .bind(entity_type.as_str())
        .bind(search)
        .bind(capped_limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list {} records: {error}",
                entity_type.as_str()
            ))
        })?;

        rows.into_iter().map(ChurchRecord::try_from).collect()
    }

    async fn find_record(
        &self,
        entity_type: EntityType,
        record_id: &str,
    ) -> AppResult<Option<ChurchRecord>> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT entity_type, record_id, data, created_by, created_at, updated_at
            FROM church_records
            WHERE entity_type = $1 AND record_id = $2
            "#,
        )
        .bind(entity_type.as_str())
        .bind(record_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find {} '{record_id}': {error}",
                entity_type.as_str()
            ))
        })?;

        row.map(ChurchRecord::try_from).transpose()
    }

    async fn insert_record(&self, record: NewRecord) -> AppResult<ChurchRecord> {
        let record_id = match record.record_id {
            Some(record_id) => record_id,
            None => self.allocate_record_id(record.entity_type).await?,
        };

        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            INSERT INTO church_records (
                entity_type,
                record_id,
                data,
                created_by,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (entity_type, record_id) DO NOTHING
            RETURNING entity_type, record_id, data, created_by, created_at, updated_at
            "#,
        )
        .bind(record.entity_type.as_str())
        .bind(record_id.as_str())
        .bind(&record.data)
        .bind(record.created_by.as_str())
        .bind(record.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(
                error,
                &format!("insert {} '{record_id}'", record.entity_type.as_str()),
            )
        })?;

        let Some(row) = row else {
            return Err(AppError::Conflict(format!(
                "{} '{record_id}' already exists",
                record.entity_type.as_str()
            )));
        };

        ChurchRecord::try_from(row)
    }

    async fn update_record(
        &self,
        entity_type: EntityType,
        record_id: &str,
        data: Value,
        updated_at: DateTime<Utc>,
    ) -> AppResult<ChurchRecord> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            UPDATE church_records
            SET data = $3, updated_at = $4
            WHERE entity_type = $1 AND record_id = $2
            RETURNING entity_type, record_id, data, created_by, created_at, updated_at
            "#,
        )
        .bind(entity_type.as_str())
        .bind(record_id)
        .bind(&data)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(
                error,
                &format!("update {} '{record_id}'", entity_type.as_str()),
            )
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "{} '{record_id}' does not exist",
                entity_type.as_str()
            ))
        })?;

        ChurchRecord::try_from(row)
    }

    async fn delete_record(&self, entity_type: EntityType, record_id: &str) -> AppResult<()> {
        let result =
            sqlx::query("DELETE FROM church_records WHERE entity_type = $1 AND record_id = $2")
                .bind(entity_type.as_str())
                .bind(record_id)
                .execute(&self.pool)
                .await
                .map_err(|error| {
                    AppError::Internal(format!(
                        "failed to delete {} '{record_id}': {error}",
                        entity_type.as_str()
                    ))
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "{} '{record_id}' does not exist",
                entity_type.as_str()
            )));
        }

        Ok(())
    }

    async fn find_attendance(
        &self,
        member_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<ChurchRecord>> {
        self.find_attendance_row(member_id, date).await
    }

    async fn upsert_attendance(
        &self,
        date: NaiveDate,
        entry: AttendanceEntry,
        recorded_by: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ChurchRecord> {
        self.upsert_attendance_row(date, entry, recorded_by, now)
            .await
    }
}

/// Escapes `LIKE` wildcards so a search term matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        if matches!(character, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped
}

/// Maps the attendance member/date unique index onto `Conflict`.
fn conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!(
            "failed to {operation}: attendance for that member and date already exists"
        ));
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}
