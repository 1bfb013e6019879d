use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ecclesia_application::{RecycleBinQuery, RecycleBinRepository};
use ecclesia_core::{AppError, AppResult};
use ecclesia_domain::RecycleBinItem;
use serde_json::Value;
use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed recycle bin.
///
/// The type tag is stored verbatim so envelopes written by newer builds
/// still list; interpretation happens on restore.
#[derive(Clone)]
pub struct PostgresRecycleBinRepository {
    pool: PgPool,
}

impl PostgresRecycleBinRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RecycleBinRow {
    id: String,
    original_id: String,
    #[sqlx(rename = "type")]
    type_tag: String,
    data: Value,
    deleted_by: String,
    deleted_at: DateTime<Utc>,
    reason: Option<String>,
}

impl TryFrom<RecycleBinRow> for RecycleBinItem {
    type Error = AppError;

    fn try_from(row: RecycleBinRow) -> Result<Self, Self::Error> {
        RecycleBinItem::from_storage(
            row.id,
            row.original_id,
            row.type_tag,
            row.data,
            row.deleted_by,
            row.deleted_at,
            row.reason,
        )
    }
}

#[async_trait]
impl RecycleBinRepository for PostgresRecycleBinRepository {
    async fn insert_item(&self, item: RecycleBinItem) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO recycle_bin (id, original_id, type, data, deleted_by, deleted_at, reason)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(item.id())
        .bind(item.original_id())
        .bind(item.type_tag())
        .bind(item.data())
        .bind(item.deleted_by())
        .bind(item.deleted_at())
        .bind(item.reason())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to insert recycle bin item '{}': {error}",
                item.id()
            ))
        })?;

        Ok(())
    }

    async fn list_items(&self, query: RecycleBinQuery) -> AppResult<Vec<RecycleBinItem>> {
        let limit = query.limit.map(|limit| limit as i64);
        let rows = sqlx::query_as::<_, RecycleBinRow>(
            r#"
            SELECT id, original_id, type, data, deleted_by, deleted_at, reason
            FROM recycle_bin
            WHERE ($1::TEXT IS NULL OR type = $1)
            ORDER BY deleted_at DESC, id
            LIMIT $2
            OFFSET $3
            "#,
        )
        .bind(query.entity_type)
        .bind(limit)
        .bind(query.offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list recycle bin: {error}")))?;

        rows.into_iter().map(RecycleBinItem::try_from).collect()
    }

    async fn find_item(&self, item_id: &str) -> AppResult<Option<RecycleBinItem>> {
        let row = sqlx::query_as::<_, RecycleBinRow>(
            r#"
            SELECT id, original_id, type, data, deleted_by, deleted_at, reason
            FROM recycle_bin
            WHERE id = $1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find recycle bin item '{item_id}': {error}"
            ))
        })?;

        row.map(RecycleBinItem::try_from).transpose()
    }

    async fn remove_item(&self, item_id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM recycle_bin WHERE id = $1")
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to remove recycle bin item '{item_id}': {error}"
                ))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "recycle bin item '{item_id}' does not exist"
            )));
        }

        Ok(())
    }
}
