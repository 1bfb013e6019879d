use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ecclesia_application::{PermissionRequestQuery, PermissionRequestRepository};
use ecclesia_core::{AppError, AppResult};
use ecclesia_domain::{EntityType, PermissionRequest, RequestTarget, RequestType};
use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed permission request repository.
#[derive(Clone)]
pub struct PostgresPermissionRequestRepository {
    pool: PgPool,
}

impl PostgresPermissionRequestRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id,
        requester_id,
        requester_name,
        requester_email,
        request_type,
        data_type,
        data_id,
        data_name,
        reason,
        requested_at,
        status,
        reviewed_by,
        reviewed_at,
        review_notes,
        expires_at
    FROM permission_requests
"#;

#[derive(Debug, FromRow)]
struct PermissionRequestRow {
    id: String,
    requester_id: String,
    requester_name: String,
    requester_email: Option<String>,
    request_type: String,
    data_type: String,
    data_id: String,
    data_name: String,
    reason: String,
    requested_at: DateTime<Utc>,
    status: String,
    reviewed_by: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    review_notes: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl TryFrom<PermissionRequestRow> for PermissionRequest {
    type Error = AppError;

    fn try_from(row: PermissionRequestRow) -> Result<Self, Self::Error> {
        Ok(PermissionRequest {
            id: row.id,
            requester_id: row.requester_id,
            requester_name: row.requester_name,
            requester_email: row.requester_email,
            request_type: row.request_type.parse()?,
            target: RequestTarget {
                data_type: EntityType::from_transport(row.data_type.as_str())?,
                data_id: row.data_id,
                data_name: row.data_name,
            },
            reason: row.reason,
            requested_at: row.requested_at,
            status: row.status.parse()?,
            reviewed_by: row.reviewed_by,
            reviewed_at: row.reviewed_at,
            review_notes: row.review_notes,
            expires_at: row.expires_at,
        })
    }
}

#[async_trait]
impl PermissionRequestRepository for PostgresPermissionRequestRepository {
    async fn insert_request(&self, request: PermissionRequest) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO permission_requests (
                id,
                requester_id,
                requester_name,
                requester_email,
                request_type,
                data_type,
                data_id,
                data_name,
                reason,
                requested_at,
                status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(request.id.as_str())
        .bind(request.requester_id.as_str())
        .bind(request.requester_name.as_str())
        .bind(request.requester_email.as_deref())
        .bind(request.request_type.as_str())
        .bind(request.target.data_type.as_str())
        .bind(request.target.data_id.as_str())
        .bind(request.target.data_name.as_str())
        .bind(request.reason.as_str())
        .bind(request.requested_at)
        .bind(request.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to insert permission request '{}': {error}",
                request.id
            ))
        })?;

        Ok(())
    }

    async fn find_request(&self, request_id: &str) -> AppResult<Option<PermissionRequest>> {
        let row = sqlx::query_as::<_, PermissionRequestRow>(&format!(
            "{SELECT_COLUMNS} WHERE id = $1"
        ))
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find permission request '{request_id}': {error}"
            ))
        })?;

        row.map(PermissionRequest::try_from).transpose()
    }

    async fn list_requests(
        &self,
        query: PermissionRequestQuery,
    ) -> AppResult<Vec<PermissionRequest>> {
        let rows = sqlx::query_as::<_, PermissionRequestRow>(&format!(
            r#"{SELECT_COLUMNS}
            WHERE ($1::TEXT IS NULL OR requester_id = $1)
                AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY requested_at DESC, id
            LIMIT $3
            OFFSET $4
            "#
        ))
        .bind(query.requester_id)
        .bind(query.status.map(|status| status.as_str()))
        .bind(query.limit.clamp(1, 500) as i64)
        .bind(query.offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list permission requests: {error}"))
        })?;

        rows.into_iter().map(PermissionRequest::try_from).collect()
    }

    async fn save_review(&self, request: &PermissionRequest) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE permission_requests
            SET status = $2,
                reviewed_by = $3,
                reviewed_at = $4,
                review_notes = $5,
                expires_at = $6
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(request.id.as_str())
        .bind(request.status.as_str())
        .bind(request.reviewed_by.as_deref())
        .bind(request.reviewed_at)
        .bind(request.review_notes.as_deref())
        .bind(request.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to save review for permission request '{}': {error}",
                request.id
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "permission request '{}' is no longer pending",
                request.id
            )));
        }

        Ok(())
    }

    async fn find_active_grant(
        &self,
        requester_id: &str,
        request_type: RequestType,
        data_type: EntityType,
        data_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<PermissionRequest>> {
        let row = sqlx::query_as::<_, PermissionRequestRow>(&format!(
            r#"{SELECT_COLUMNS}
            WHERE requester_id = $1
                AND request_type = $2
                AND data_type = $3
                AND data_id = $4
                AND status = 'approved'
                AND expires_at > $5
            ORDER BY expires_at DESC
            LIMIT 1
            "#
        ))
        .bind(requester_id)
        .bind(request_type.as_str())
        .bind(data_type.as_str())
        .bind(data_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find active permission grant: {error}"))
        })?;

        row.map(PermissionRequest::try_from).transpose()
    }

    async fn expire_elapsed(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE permission_requests
            SET status = 'expired'
            WHERE status = 'approved' AND expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to expire permission grants: {error}"))
        })?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests;
