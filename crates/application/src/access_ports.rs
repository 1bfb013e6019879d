use async_trait::async_trait;
use ecclesia_core::AppResult;
use ecclesia_domain::UserProfile;

/// Repository port for stored user profiles.
#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    /// Finds a profile by identity-provider subject.
    async fn find_profile(&self, subject: &str) -> AppResult<Option<UserProfile>>;

    /// Lists all profiles ordered by display name.
    async fn list_profiles(&self) -> AppResult<Vec<UserProfile>>;

    /// Inserts or replaces a profile.
    async fn save_profile(&self, profile: UserProfile) -> AppResult<()>;

    /// Deletes a profile, failing with `NotFound` when absent.
    async fn delete_profile(&self, subject: &str) -> AppResult<()>;
}

/// Effective access of one user to one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionAccess {
    /// Section can be opened.
    pub can_access: bool,
    /// Section data can be written.
    pub can_edit: bool,
}
