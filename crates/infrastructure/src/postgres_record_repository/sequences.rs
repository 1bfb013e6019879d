use ecclesia_core::{AppError, AppResult};
use ecclesia_domain::{EntityType, RecordIdStrategy, format_prefixed_id};
use uuid::Uuid;

use super::PostgresRecordRepository;

impl PostgresRecordRepository {
    /// Allocates the next identifier for a type per its id strategy.
    pub(super) async fn allocate_record_id(&self, entity_type: EntityType) -> AppResult<String> {
        match entity_type.id_strategy() {
            RecordIdStrategy::Prefixed(prefix) => {
                let sequence = self.next_sequence(entity_type).await?;
                Ok(format_prefixed_id(prefix, sequence))
            }
            RecordIdStrategy::Serial => Ok(self.next_sequence(entity_type).await?.to_string()),
            RecordIdStrategy::Uuid => Ok(Uuid::new_v4().to_string()),
            RecordIdStrategy::Subject => Err(AppError::Validation(format!(
                "{} identifiers come from the identity provider",
                entity_type.as_str()
            ))),
        }
    }

    async fn next_sequence(&self, entity_type: EntityType) -> AppResult<u64> {
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO record_sequences (entity_type, last_value)
            VALUES ($1, 1)
            ON CONFLICT (entity_type) DO UPDATE
            SET last_value = record_sequences.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(entity_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to allocate {} identifier: {error}",
                entity_type.as_str()
            ))
        })?;

        u64::try_from(value).map_err(|_| {
            AppError::Internal(format!(
                "record sequence for {} is negative",
                entity_type.as_str()
            ))
        })
    }
}
