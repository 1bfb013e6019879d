use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ecclesia_application::{AttendanceEntry, NewRecord, RecordListQuery, RecordRepository};
use ecclesia_core::{AppError, AppResult};
use ecclesia_domain::{ChurchRecord, EntityType, RecordIdStrategy, format_prefixed_id};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory record store implementation.
#[derive(Debug, Default)]
pub struct InMemoryRecordRepository {
    records: RwLock<HashMap<(EntityType, String), ChurchRecord>>,
    sequences: RwLock<HashMap<EntityType, u64>>,
}

impl InMemoryRecordRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            sequences: RwLock::new(HashMap::new()),
        }
    }

    async fn allocate_record_id(&self, entity_type: EntityType) -> AppResult<String> {
        let strategy = entity_type.id_strategy();
        if strategy == RecordIdStrategy::Uuid {
            return Ok(Uuid::new_v4().to_string());
        }
        if strategy == RecordIdStrategy::Subject {
            return Err(AppError::Validation(format!(
                "{} identifiers come from the identity provider",
                entity_type.as_str()
            )));
        }

        let mut sequences = self.sequences.write().await;
        let sequence = sequences.entry(entity_type).or_insert(0);
        *sequence += 1;

        Ok(match strategy {
            RecordIdStrategy::Prefixed(prefix) => format_prefixed_id(prefix, *sequence),
            _ => sequence.to_string(),
        })
    }
}

fn matches_search(record: &ChurchRecord, needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };

    record
        .data()
        .as_object()
        .into_iter()
        .flat_map(|object| object.values())
        .filter_map(Value::as_str)
        .any(|value| value.to_lowercase().contains(needle))
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    async fn list_records(
        &self,
        entity_type: EntityType,
        query: RecordListQuery,
    ) -> AppResult<Vec<ChurchRecord>> {
        let needle = query
            .search
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty());
        let records = self.records.read().await;

        let mut values: Vec<ChurchRecord> = records
            .values()
            .filter(|record| record.entity_type() == entity_type)
            .filter(|record| matches_search(record, needle.as_deref()))
            .cloned()
            .collect();
        values.sort_by(|left, right| {
            left.created_at()
                .cmp(&right.created_at())
                .then_with(|| left.record_id().cmp(right.record_id()))
        });

        Ok(values
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn find_record(
        &self,
        entity_type: EntityType,
        record_id: &str,
    ) -> AppResult<Option<ChurchRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(&(entity_type, record_id.to_owned()))
            .cloned())
    }

    async fn insert_record(&self, record: NewRecord) -> AppResult<ChurchRecord> {
        let record_id = match record.record_id {
            Some(record_id) => record_id,
            None => self.allocate_record_id(record.entity_type).await?,
        };

        let key = (record.entity_type, record_id.clone());
        let mut records = self.records.write().await;
        if records.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "{} '{record_id}' already exists",
                record.entity_type.as_str()
            )));
        }

        let stored = ChurchRecord::new(
            record_id,
            record.entity_type,
            record.data,
            record.created_by,
            record.created_at,
            record.created_at,
        )?;
        records.insert(key, stored.clone());
        Ok(stored)
    }

    async fn update_record(
        &self,
        entity_type: EntityType,
        record_id: &str,
        data: Value,
        updated_at: DateTime<Utc>,
    ) -> AppResult<ChurchRecord> {
        let mut records = self.records.write().await;
        let key = (entity_type, record_id.to_owned());
        let Some(existing) = records.get(&key) else {
            return Err(AppError::NotFound(format!(
                "{} '{record_id}' does not exist",
                entity_type.as_str()
            )));
        };

        let updated = ChurchRecord::new(
            record_id,
            entity_type,
            data,
            existing.created_by(),
            existing.created_at(),
            updated_at,
        )?;
        records.insert(key, updated.clone());
        Ok(updated)
    }

    async fn delete_record(&self, entity_type: EntityType, record_id: &str) -> AppResult<()> {
        self.records
            .write()
            .await
            .remove(&(entity_type, record_id.to_owned()))
            .map(|_| ())
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "{} '{record_id}' does not exist",
                    entity_type.as_str()
                ))
            })
    }

    async fn find_attendance(
        &self,
        member_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<ChurchRecord>> {
        let date = date.format("%Y-%m-%d").to_string();
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|record| {
                record.entity_type() == EntityType::AttendanceRecord
                    && record.data().get("member_id").and_then(Value::as_str) == Some(member_id)
                    && record.data().get("date").and_then(Value::as_str) == Some(date.as_str())
            })
            .cloned())
    }

    async fn upsert_attendance(
        &self,
        date: NaiveDate,
        entry: AttendanceEntry,
        recorded_by: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ChurchRecord> {
        let existing_id = self
            .find_attendance(&entry.member_id, date)
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
