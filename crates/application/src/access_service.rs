use std::sync::Arc;

use chrono::Utc;
use ecclesia_core::{AppError, AppResult, UserIdentity};
use ecclesia_domain::{
    AuditAction, ChurchRecord, MenuItem, ModificationDecision, PermissionRequest, RequestType,
    Section, UserProfile, accessible_menu_items, can_access_section, can_administer,
    can_edit_data, modification_decision,
};
use tracing::info;

use crate::{
    AuditEvent, AuditRepository, PermissionRequestRepository, SectionAccess, UserProfileRepository,
};

/// Application service resolving the caller's profile and enforcing access decisions.
///
/// Every check reloads the profile, so role changes apply to the next request.
#[derive(Clone)]
pub struct AccessService {
    profiles: Arc<dyn UserProfileRepository>,
    permission_requests: Arc<dyn PermissionRequestRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl AccessService {
    /// Creates a new access service from repository implementations.
    #[must_use]
    pub fn new(
        profiles: Arc<dyn UserProfileRepository>,
        permission_requests: Arc<dyn PermissionRequestRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            profiles,
            permission_requests,
            audit_repository,
        }
    }

    /// Returns the stored profile of the caller, if one exists.
    pub async fn current_profile(&self, actor: &UserIdentity) -> AppResult<Option<UserProfile>> {
        self.profiles.find_profile(actor.subject()).await
    }

    /// Returns the caller's profile or `Forbidden` when none exists.
    pub async fn require_profile(&self, actor: &UserIdentity) -> AppResult<UserProfile> {
        self.current_profile(actor).await?.ok_or_else(|| {
            AppError::Forbidden(format!("subject '{}' has no profile", actor.subject()))
        })
    }

    /// Returns navigation entries for the caller.
    pub async fn accessible_menu(&self, actor: &UserIdentity) -> AppResult<Vec<MenuItem>> {
        let profile = self.current_profile(actor).await?;
        Ok(accessible_menu_items(profile.as_ref()))
    }

    /// Returns the caller's effective access to one section.
    pub async fn section_access(
        &self,
        actor: &UserIdentity,
        section: Section,
    ) -> AppResult<SectionAccess> {
        let profile = self.current_profile(actor).await?;
        Ok(SectionAccess {
            can_access: can_access_section(profile.as_ref(), section),
            can_edit: can_access_section(profile.as_ref(), section)
                && can_edit_data(profile.as_ref(), section),
        })
    }

    /// Ensures the caller may open a section.
    pub async fn require_section_access(
        &self,
        actor: &UserIdentity,
        section: Section,
    ) -> AppResult<UserProfile> {
        let profile = self.current_profile(actor).await?;
        match profile {
            Some(profile) if can_access_section(Some(&profile), section) => Ok(profile),
            _ => Err(AppError::Forbidden(format!(
                "subject '{}' may not access section '{}'",
                actor.subject(),
                section.as_str()
            ))),
        }
    }

    /// Ensures the caller may write data in a section.
    pub async fn require_section_edit(
        &self,
        actor: &UserIdentity,
        section: Section,
    ) -> AppResult<UserProfile> {
        let profile = self.require_section_access(actor, section).await?;
        if !can_edit_data(Some(&profile), section) {
            return Err(AppError::Forbidden(format!(
                "subject '{}' may not edit section '{}'",
                actor.subject(),
                section.as_str()
            )));
        }

        Ok(profile)
    }

    /// Ensures the caller may administer the recycle bin and review requests.
    pub async fn require_administrator(&self, actor: &UserIdentity) -> AppResult<UserProfile> {
        let profile = self.current_profile(actor).await?;
        match profile {
            Some(profile) if can_administer(Some(&profile)) => Ok(profile),
            _ => Err(AppError::Forbidden(format!(
                "subject '{}' is not an administrator",
                actor.subject()
            ))),
        }
    }

    /// Ensures the caller may edit or delete an existing record.
    ///
    /// When the static decision requires approval, an active approved
    /// permission request for exactly this change is consulted and its use is
    /// audited.
    pub async fn require_record_modification(
        &self,
        actor: &UserIdentity,
        request_type: RequestType,
        record: &ChurchRecord,
    ) -> AppResult<UserProfile> {
        let profile = self.require_profile(actor).await?;
        let Some(section) = record.entity_type().view_section() else {
            return Err(AppError::Forbidden(format!(
                "'{}' records are not modified through sections",
                record.entity_type().as_str()
            )));
        };

        let originated_by_user = record.created_by() == profile.subject();
        match modification_decision(Some(&profile), section, originated_by_user) {
            ModificationDecision::Allowed => Ok(profile),
            ModificationDecision::Denied => Err(AppError::Forbidden(format!(
                "subject '{}' may not {} '{}' records",
                actor.subject(),
                request_type.as_str(),
                record.entity_type().as_str()
            ))),
            ModificationDecision::RequiresApproval => {
                let grant = self
                    .permission_requests
                    .find_active_grant(
                        profile.subject(),
                        request_type,
                        record.entity_type(),
                        record.record_id(),
                        Utc::now(),
                    )
                    .await?;

                match grant {
                    Some(grant) => {
                        self.append_grant_use_event(&profile, &grant).await?;
                        Ok(profile)
                    }
                    None => Err(AppError::Forbidden(format!(
                        "{} of {} '{}' requires an approved permission request",
                        request_type.as_str(),
                        record.entity_type().as_str(),
                        record.record_id()
                    ))),
                }
            }
        }
    }

    async fn append_grant_use_event(
        &self,
        profile: &UserProfile,
        grant: &PermissionRequest,
    ) -> AppResult<()> {
        let expires_at = grant
            .expires_at
            .map(|value| value.to_rfc3339())
            .unwrap_or_default();
        info!(
            subject = profile.subject(),
            request_id = %grant.id,
            expires_at = %expires_at,
            "approved permission request used"
        );

        self.audit_repository
            .append_event(AuditEvent {
                subject: profile.subject().to_owned(),
                action: AuditAction::PermissionGrantUsed,
                resource_type: "permission_request".to_owned(),
                resource_id: grant.id.clone(),
                detail: Some(format!(
                    "used {} grant on {} '{}' (expires_at='{}', reason='{}')",
                    grant.request_type.as_str(),
                    grant.target.data_type.as_str(),
                    grant.target.data_id,
                    expires_at,
                    grant.reason
                )),
            })
            .await
    }
}
