use std::collections::BTreeSet;
use std::sync::Arc;

use ecclesia_core::{AppError, AppResult, UserIdentity};
use ecclesia_domain::{
    AuditAction, EntityType, PermissionLevel, Role, Section, UserProfile,
    can_manage_data_personnel, can_manage_users,
};
use tracing::info;

use crate::{
    AccessService, AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
    RecycleBinService, UserProfileRepository,
};

/// Input payload for changing a user's access attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUserAccessInput {
    /// New role.
    pub role: Role,
    /// New permission level.
    pub permission_level: Option<PermissionLevel>,
    /// New assigned sections; ignored for roles other than data personnel.
    pub assigned_sections: BTreeSet<Section>,
}

/// Application service for account provisioning and administration.
#[derive(Clone)]
pub struct UserAdminService {
    access_service: AccessService,
    profiles: Arc<dyn UserProfileRepository>,
    recycle_bin_service: RecycleBinService,
    audit_log_repository: Arc<dyn AuditLogRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl UserAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        access_service: AccessService,
        profiles: Arc<dyn UserProfileRepository>,
        recycle_bin_service: RecycleBinService,
        audit_log_repository: Arc<dyn AuditLogRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            access_service,
            profiles,
            recycle_bin_service,
            audit_log_repository,
            audit_repository,
        }
    }

    /// Loads the caller's profile, creating a guest profile on first sign-in.
    pub async fn ensure_profile(&self, identity: &UserIdentity) -> AppResult<UserProfile> {
        let email = identity.email().map(str::to_owned);

        match self.profiles.find_profile(identity.subject()).await? {
            Some(profile) => {
                let mut refreshed = profile.clone();
                refreshed.refresh_identity(identity.display_name(), email)?;
                if refreshed != profile {
                    self.profiles.save_profile(refreshed.clone()).await?;
                }
                Ok(refreshed)
            }
            None => {
                let profile = UserProfile::new(
                    identity.subject(),
                    identity.display_name(),
                    email,
                    Role::Guest,
                )?;
                self.profiles.save_profile(profile.clone()).await?;
                info!(subject = identity.subject(), "created guest profile");
                Ok(profile)
            }
        }
    }

    /// Grants the super admin role to the configured bootstrap subject.
    pub async fn promote_bootstrap_super_admin(&self, subject: &str) -> AppResult<UserProfile> {
        let mut profile = match self.profiles.find_profile(subject).await? {
            Some(profile) => profile,
            None => UserProfile::new(subject, subject, None, Role::SuperAdmin)?,
        };

        if profile.role() != Role::SuperAdmin {
            profile.set_access(Role::SuperAdmin, None, BTreeSet::new());
        }
        self.profiles.save_profile(profile.clone()).await?;
        info!(subject, "bootstrap super admin ensured");

        Ok(profile)
    }

    /// Lists all accounts.
    pub async fn list_users(&self, actor: &UserIdentity) -> AppResult<Vec<UserProfile>> {
        let profile = self.access_service.require_profile(actor).await?;
        if !can_manage_users(Some(&profile)) && !can_manage_data_personnel(Some(&profile)) {
            return Err(AppError::Forbidden(format!(
                "subject '{}' may not list users",
                actor.subject()
            )));
        }

        self.profiles.list_profiles().await
    }

    /// Changes another account's role, level, or assigned sections.
    ///
    /// Without `can_manage_users` only the sections of existing data
    /// personnel can change.
    pub async fn update_user_access(
        &self,
        actor: &UserIdentity,
        subject: &str,
        input: UpdateUserAccessInput,
    ) -> AppResult<UserProfile> {
        let actor_profile = self.access_service.require_profile(actor).await?;
        if actor_profile.subject() == subject {
            return Err(AppError::Forbidden(
                "users cannot change their own access".to_owned(),
            ));
        }

        let mut target = self.require_user(subject).await?;
        let sections_only = target.role() == Role::DataPersonnel
            && input.role == Role::DataPersonnel
            && target.permission_level() == input.permission_level;

        let allowed = can_manage_users(Some(&actor_profile))
            || (sections_only && can_manage_data_personnel(Some(&actor_profile)));
        if !allowed {
            return Err(AppError::Forbidden(format!(
                "subject '{}' may not change access for '{subject}'",
                actor.subject()
            )));
        }

        target.set_access(input.role, input.permission_level, input.assigned_sections);
        self.profiles.save_profile(target.clone()).await?;

        let sections = target
            .assigned_sections()
            .iter()
            .map(Section::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor_profile.subject().to_owned(),
                action: AuditAction::UserAccessUpdated,
                resource_type: EntityType::User.as_str().to_owned(),
                resource_id: target.subject().to_owned(),
                detail: Some(format!(
                    "role={} level={} sections=[{sections}]",
                    target.role().as_str(),
                    target
                        .permission_level()
                        .map(|level| level.as_str())
                        .unwrap_or("none"),
                )),
            })
            .await?;

        Ok(target)
    }

    /// Moves another account into the recycle bin.
    pub async fn delete_user(
        &self,
        actor: &UserIdentity,
        subject: &str,
        reason: Option<&str>,
    ) -> AppResult<()> {
        let actor_profile = self.access_service.require_profile(actor).await?;
        if !can_manage_users(Some(&actor_profile)) {
            return Err(AppError::Forbidden(format!(
                "subject '{}' may not delete users",
                actor.subject()
            )));
        }
        if actor_profile.subject() == subject {
            return Err(AppError::Forbidden(
                "users cannot delete their own account".to_owned(),
            ));
        }

        let target = self.require_user(subject).await?;
        let snapshot = serde_json::to_value(&target).map_err(|error| {
            AppError::Internal(format!("failed to snapshot user '{subject}': {error}"))
        })?;

        self.recycle_bin_service
            .move_to_recycle_bin(
                actor_profile.subject(),
                EntityType::User,
                target.subject(),
                snapshot,
                reason,
            )
            .await?;

        Ok(())
    }

    /// Lists recent audit entries for user managers.
    pub async fn list_audit_log(
        &self,
        actor: &UserIdentity,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        let profile = self.access_service.require_profile(actor).await?;
        if !can_manage_users(Some(&profile)) {
            return Err(AppError::Forbidden(format!(
                "subject '{}' may not read the audit log",
                actor.subject()
            )));
        }

        self.audit_log_repository.list_recent_entries(query).await
    }

    async fn require_user(&self, subject: &str) -> AppResult<UserProfile> {
        self.profiles
            .find_profile(subject)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{subject}' does not exist")))
    }
}
