use std::sync::Arc;

use chrono::Utc;
use ecclesia_core::{AppError, AppResult, UserIdentity};
use ecclesia_domain::{AuditAction, EntityType, RecycleBinItem};
use serde_json::Value;
use tracing::warn;

use crate::{
    AccessService, AuditEvent, AuditRepository, EmptyBinFailure, EmptyBinReport, RecordRepository,
    RecycleBinQuery, RecycleBinRepository, RestoredEntity, UserProfileRepository,
};

mod restore;

/// Application service owning the soft-delete lifecycle.
///
/// Envelope writes and origin-store writes are separate repository calls; each
/// two-step transition undoes its first step when the second fails.
#[derive(Clone)]
pub struct RecycleBinService {
    access_service: AccessService,
    repository: Arc<dyn RecycleBinRepository>,
    records: Arc<dyn RecordRepository>,
    profiles: Arc<dyn UserProfileRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RecycleBinService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        access_service: AccessService,
        repository: Arc<dyn RecycleBinRepository>,
        records: Arc<dyn RecordRepository>,
        profiles: Arc<dyn UserProfileRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            access_service,
            repository,
            records,
            profiles,
            audit_repository,
        }
    }

    /// Wraps an entity snapshot in an envelope, then deletes the entity.
    ///
    /// Callers perform their own access checks.
    pub async fn move_to_recycle_bin(
        &self,
        deleted_by: &str,
        entity_type: EntityType,
        original_id: &str,
        data: Value,
        reason: Option<&str>,
    ) -> AppResult<RecycleBinItem> {
        let item = RecycleBinItem::wrap(
            entity_type,
            original_id,
            data,
            deleted_by,
            reason,
            Utc::now(),
        )?;
        self.repository.insert_item(item.clone()).await?;

        if let Err(error) = self.delete_from_origin(entity_type, original_id).await {
            if let Err(cleanup_error) = self.repository.remove_item(item.id()).await {
                warn!(
                    item_id = item.id(),
                    error = %cleanup_error,
                    "failed to remove envelope after origin delete failed"
                );
            }
            return Err(error);
        }

        self.audit_repository
            .append_event(AuditEvent {
                subject: deleted_by.to_owned(),
                action: AuditAction::RecordDeleted,
                resource_type: entity_type.as_str().to_owned(),
                resource_id: original_id.to_owned(),
                detail: Some(format!("moved to recycle bin as '{}'", item.id())),
            })
            .await?;

        Ok(item)
    }

    /// Lists envelopes for administrators.
    pub async fn list_items(
        &self,
        actor: &UserIdentity,
        query: RecycleBinQuery,
    ) -> AppResult<Vec<RecycleBinItem>> {
        self.access_service.require_administrator(actor).await?;
        self.repository.list_items(query).await
    }

    /// Re-inserts an envelope's snapshot into its origin store and drops the envelope.
    pub async fn restore(&self, actor: &UserIdentity, item_id: &str) -> AppResult<RestoredEntity> {
        self.access_service.require_administrator(actor).await?;
        let item = self.require_item(item_id).await?;

        let reinserted = self.reinsert(&item).await?;

        if let Err(error) = self.repository.remove_item(item.id()).await {
            if let Err(cleanup_error) = self.undo_reinsert(&reinserted).await {
                warn!(
                    item_id = item.id(),
                    error = %cleanup_error,
                    "failed to undo restore after envelope removal failed"
                );
            }
            return Err(error);
        }

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::RecycleBinRestored,
                resource_type: item.type_tag().to_owned(),
                resource_id: item.original_id().to_owned(),
                detail: Some(format!("restored from '{}'", item.id())),
            })
            .await?;

        Ok(reinserted.restored)
    }

    /// Permanently deletes one envelope.
    pub async fn remove_from_recycle_bin(&self, actor: &UserIdentity, item_id: &str) -> AppResult<()> {
        self.access_service.require_administrator(actor).await?;
        self.purge(actor, item_id).await
    }

    /// Permanently deletes every envelope, continuing past failures.
    pub async fn empty_bin(&self, actor: &UserIdentity) -> AppResult<EmptyBinReport> {
        self.access_service.require_administrator(actor).await?;

        let items = self.repository.list_items(RecycleBinQuery::default()).await?;
        let mut report = EmptyBinReport::default();
        for item in items {
            match self.purge(actor, item.id()).await {
                Ok(()) => report.removed.push(item.id().to_owned()),
                Err(error) => {
                    warn!(item_id = item.id(), error = %error, "failed to purge envelope");
                    report.failed.push(EmptyBinFailure {
                        item_id: item.id().to_owned(),
                        message: error.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Removes one envelope. Once the removal succeeds the purge counts as
    /// done, so a failed audit write is only logged.
    async fn purge(&self, actor: &UserIdentity, item_id: &str) -> AppResult<()> {
        self.repository.remove_item(item_id).await?;

        if let Err(error) = self
            .audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::RecycleBinPurged,
                resource_type: "recycle_bin".to_owned(),
                resource_id: item_id.to_owned(),
                detail: None,
            })
            .await
        {
            warn!(item_id, error = %error, "failed to audit envelope purge");
        }

        Ok(())
    }

    async fn require_item(&self, item_id: &str) -> AppResult<RecycleBinItem> {
        self.repository
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("recycle bin item '{item_id}' does not exist")))
    }

    async fn delete_from_origin(&self, entity_type: EntityType, original_id: &str) -> AppResult<()> {
        match entity_type {
            EntityType::User => self.profiles.delete_profile(original_id).await,
            other => self.records.delete_record(other, original_id).await,
        }
    }
}
