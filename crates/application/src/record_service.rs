use std::sync::Arc;

use chrono::Utc;
use ecclesia_core::{AppError, AppResult, UserIdentity};
use ecclesia_domain::{AuditAction, ChurchRecord, EntityType, RequestType, Section};
use serde_json::Value;

use crate::{
    AccessService, AuditEvent, AuditRepository, NewRecord, RecordListQuery, RecordRepository,
    RecycleBinService,
};

mod attendance;

/// Application service for section-governed church records.
#[derive(Clone)]
pub struct RecordService {
    access_service: AccessService,
    records: Arc<dyn RecordRepository>,
    recycle_bin_service: RecycleBinService,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RecordService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        access_service: AccessService,
        records: Arc<dyn RecordRepository>,
        recycle_bin_service: RecycleBinService,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            access_service,
            records,
            recycle_bin_service,
            audit_repository,
        }
    }

    /// Lists records of one type.
    pub async fn list_records(
        &self,
        actor: &UserIdentity,
        entity_type: EntityType,
        query: RecordListQuery,
    ) -> AppResult<Vec<ChurchRecord>> {
        self.access_service
            .require_section_access(actor, view_section(entity_type)?)
            .await?;
        self.records.list_records(entity_type, query).await
    }

    /// Returns one record.
    pub async fn get_record(
        &self,
        actor: &UserIdentity,
        entity_type: EntityType,
        record_id: &str,
    ) -> AppResult<ChurchRecord> {
        self.access_service
            .require_section_access(actor, view_section(entity_type)?)
            .await?;
        self.require_record(entity_type, record_id).await
    }

    /// Creates a record after validating its payload.
    pub async fn create_record(
        &self,
        actor: &UserIdentity,
        entity_type: EntityType,
        data: Value,
    ) -> AppResult<ChurchRecord> {
        let section = entity_type.create_section().ok_or_else(|| unreachable_type(entity_type))?;
        let profile = self.access_service.require_section_edit(actor, section).await?;
        let object = entity_type.validate_payload(&data)?;

        let record = if entity_type == EntityType::AttendanceRecord {
            self.upsert_attendance_object(profile.subject(), &object).await?
        } else {
            self.records
                .insert_record(NewRecord {
                    entity_type,
                    record_id: None,
                    data: Value::Object(object),
                    created_by: profile.subject().to_owned(),
                    created_at: Utc::now(),
                })
                .await?
        };

        self.append_event(profile.subject(), AuditAction::RecordCreated, &record)
            .await?;

        Ok(record)
    }

    /// Replaces a record's data.
    ///
    /// Limited roles need an active edit grant unless they created the record.
    pub async fn update_record(
        &self,
        actor: &UserIdentity,
        entity_type: EntityType,
        record_id: &str,
        data: Value,
    ) -> AppResult<ChurchRecord> {
        view_section(entity_type)?;
        let existing = self.require_record(entity_type, record_id).await?;
        let profile = self
            .access_service
            .require_record_modification(actor, RequestType::Edit, &existing)
            .await?;
        let mut object = entity_type.validate_payload(&data)?;
        if entity_type == EntityType::AttendanceRecord {
            self.prepare_attendance_update(record_id, &mut object).await?;
        }

        let record = self
            .records
            .update_record(entity_type, record_id, Value::Object(object), Utc::now())
            .await?;

        self.append_event(profile.subject(), AuditAction::RecordUpdated, &record)
            .await?;

        Ok(record)
    }

    /// Moves a record into the recycle bin.
    pub async fn delete_record(
        &self,
        actor: &UserIdentity,
        entity_type: EntityType,
        record_id: &str,
        reason: Option<&str>,
    ) -> AppResult<()> {
        view_section(entity_type)?;
        let existing = self.require_record(entity_type, record_id).await?;
        let profile = self
            .access_service
            .require_record_modification(actor, RequestType::Delete, &existing)
            .await?;

        let snapshot = serde_json::to_value(&existing).map_err(|error| {
            AppError::Internal(format!(
                "failed to snapshot {} '{record_id}': {error}",
                entity_type.as_str()
            ))
        })?;

        self.recycle_bin_service
            .move_to_recycle_bin(
                profile.subject(),
                entity_type,
                existing.record_id(),
                snapshot,
                reason,
            )
            .await?;

        Ok(())
    }

    async fn require_record(
        &self,
        entity_type: EntityType,
        record_id: &str,
    ) -> AppResult<ChurchRecord> {
        self.records
            .find_record(entity_type, record_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "{} '{record_id}' does not exist",
                    entity_type.as_str()
                ))
            })
    }

    async fn append_event(
        &self,
        subject: &str,
        action: AuditAction,
        record: &ChurchRecord,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                subject: subject.to_owned(),
                action,
                resource_type: record.entity_type().as_str().to_owned(),
                resource_id: record.record_id().to_owned(),
                detail: Some(record.display_name()),
            })
            .await
    }
}

fn view_section(entity_type: EntityType) -> AppResult<Section> {
    entity_type
        .view_section()
        .ok_or_else(|| unreachable_type(entity_type))
}

fn unreachable_type(entity_type: EntityType) -> AppError {
    AppError::Validation(format!(
        "'{}' is not managed through the record store",
        entity_type.as_str()
    ))
}

#[cfg(test)]
mod tests;
