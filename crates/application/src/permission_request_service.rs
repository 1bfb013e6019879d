use std::sync::Arc;

use chrono::Utc;
use ecclesia_core::{AppError, AppResult, UserIdentity};
use ecclesia_domain::{
    AuditAction, PermissionRequest, RequestStatus, RequestTarget, can_administer,
};
use tracing::info;

use crate::{
    AccessService, AuditEvent, AuditRepository, PermissionRequestQuery,
    PermissionRequestRepository, RecordRepository, SubmitPermissionRequestInput,
};

/// Application service for the permission-request workflow.
#[derive(Clone)]
pub struct PermissionRequestService {
    access_service: AccessService,
    repository: Arc<dyn PermissionRequestRepository>,
    records: Arc<dyn RecordRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl PermissionRequestService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        access_service: AccessService,
        repository: Arc<dyn PermissionRequestRepository>,
        records: Arc<dyn RecordRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            access_service,
            repository,
            records,
            audit_repository,
        }
    }

    /// Submits a request to edit or delete an existing record.
    pub async fn submit(
        &self,
        actor: &UserIdentity,
        input: SubmitPermissionRequestInput,
    ) -> AppResult<PermissionRequest> {
        let Some(section) = input.data_type.view_section() else {
            return Err(AppError::Validation(format!(
                "permission requests cannot target '{}'",
                input.data_type.as_str()
            )));
        };
        let profile = self
            .access_service
            .require_section_access(actor, section)
            .await?;

        let record = self
            .records
            .find_record(input.data_type, input.data_id.trim())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "{} '{}' does not exist",
                    input.data_type.as_str(),
                    input.data_id
                ))
            })?;

        let request = PermissionRequest::submit(
            &profile,
            input.request_type,
            RequestTarget {
                data_type: input.data_type,
                data_id: record.record_id().to_owned(),
                data_name: record.display_name(),
            },
            &input.reason,
            Utc::now(),
        )?;
        self.repository.insert_request(request.clone()).await?;

        self.append_event(
            profile.subject(),
            AuditAction::PermissionRequested,
            &request,
            Some(format!(
                "{} {} '{}': {}",
                request.request_type.as_str(),
                request.target.data_type.as_str(),
                request.target.data_id,
                request.reason
            )),
        )
        .await?;

        Ok(request)
    }

    /// Lists requests visible to the caller.
    ///
    /// Reviewers see every request; everyone else sees their own. Elapsed
    /// approvals are swept before listing so the status filter is accurate.
    pub async fn list_requests(
        &self,
        actor: &UserIdentity,
        status: Option<RequestStatus>,
        limit: usize,
        offset: usize,
    ) -> AppResult<Vec<PermissionRequest>> {
        let profile = self.access_service.require_profile(actor).await?;
        self.repository.expire_elapsed(Utc::now()).await?;

        let requester_id =
            (!can_administer(Some(&profile))).then(|| profile.subject().to_owned());
        self.repository
            .list_requests(PermissionRequestQuery {
                requester_id,
                status,
                limit,
                offset,
            })
            .await
    }

    /// Approves a pending request and opens its grant window.
    pub async fn approve(
        &self,
        actor: &UserIdentity,
        request_id: &str,
        notes: Option<&str>,
    ) -> AppResult<PermissionRequest> {
        let reviewer = self.access_service.require_administrator(actor).await?;
        let mut request = self.require_request(request_id).await?;

        request.approve(&reviewer, notes, Utc::now())?;
        self.repository.save_review(&request).await?;

        let expires_at = request
            .expires_at
            .map(|value| value.to_rfc3339())
            .unwrap_or_default();
        self.append_event(
            reviewer.subject(),
            AuditAction::PermissionApproved,
            &request,
            Some(format!("grant expires at {expires_at}")),
        )
        .await?;

        Ok(request)
    }

    /// Denies a pending request. Notes are mandatory.
    pub async fn deny(
        &self,
        actor: &UserIdentity,
        request_id: &str,
        notes: &str,
    ) -> AppResult<PermissionRequest> {
        let reviewer = self.access_service.require_administrator(actor).await?;
        let mut request = self.require_request(request_id).await?;

        request.deny(&reviewer, notes, Utc::now())?;
        self.repository.save_review(&request).await?;

        self.append_event(
            reviewer.subject(),
            AuditAction::PermissionDenied,
            &request,
            request.review_notes.clone(),
        )
        .await?;

        Ok(request)
    }

    /// Marks elapsed approvals as expired. Used by the background worker.
    pub async fn expire_elapsed_grants(&self) -> AppResult<u64> {
        let expired = self.repository.expire_elapsed(Utc::now()).await?;
        if expired > 0 {
            info!(expired, "expired elapsed permission grants");
        }

        Ok(expired)
    }

    async fn require_request(&self, request_id: &str) -> AppResult<PermissionRequest> {
        self.repository
            .find_request(request_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission request '{request_id}' does not exist"))
            })
    }

    async fn append_event(
        &self,
        subject: &str,
        action: AuditAction,
        request: &PermissionRequest,
        detail: Option<String>,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                subject: subject.to_owned(),
                action,
                resource_type: "permission_request".to_owned(),
                resource_id: request.id.clone(),
                detail,
            })
            .await
    }
}

#[cfg(test)]
mod tests;
