use std::collections::BTreeSet;

use async_trait::async_trait;
use ecclesia_application::UserProfileRepository;
use ecclesia_core::{AppError, AppResult};
use ecclesia_domain::{PermissionLevel, Role, Section, UserProfile};
use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed user profile repository.
#[derive(Clone)]
pub struct PostgresUserProfileRepository {
    pool: PgPool,
}

impl PostgresUserProfileRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserProfileRow {
    subject: String,
    display_name: String,
    email: Option<String>,
    role: String,
    permission_level: Option<String>,
    assigned_sections: Vec<String>,
}

impl TryFrom<UserProfileRow> for UserProfile {
    type Error = AppError;

    fn try_from(row: UserProfileRow) -> Result<Self, Self::Error> {
        let sections = row
            .assigned_sections
            .iter()
            .map(|value| Section::from_transport(value))
            .collect::<AppResult<BTreeSet<_>>>()?;
        let permission_level = row
            .permission_level
            .as_deref()
            .map(PermissionLevel::from_transport)
            .transpose()?;

        Ok(UserProfile::new(
            row.subject,
            row.display_name,
            row.email,
            Role::from_transport(row.role.as_str())?,
        )?
        .with_permission_level(permission_level)
        .with_assigned_sections(sections))
    }
}

#[async_trait]
impl UserProfileRepository for PostgresUserProfileRepository {
    async fn find_profile(&self, subject: &str) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserProfileRow>(
            r#"
            SELECT subject, display_name, email, role, permission_level, assigned_sections
            FROM user_profiles
            WHERE subject = $1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find user profile '{subject}': {error}"))
        })?;

        row.map(UserProfile::try_from).transpose()
    }

    async fn list_profiles(&self) -> AppResult<Vec<UserProfile>> {
        let rows = sqlx::query_as::<_, UserProfileRow>(
            r#"
            SELECT subject, display_name, email, role, permission_level, assigned_sections
            FROM user_profiles
            ORDER BY display_name, subject
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list user profiles: {error}")))?;

        rows.into_iter().map(UserProfile::try_from).collect()
    }

    async fn save_profile(&self, profile: UserProfile) -> AppResult<()> {
        let sections = profile
            .assigned_sections()
            .iter()
            .map(|section| section.as_str().to_owned())
            .collect::<Vec<_>>();

        sqlx::query(
            r#"
            INSERT INTO user_profiles (
                subject,
                display_name,
                email,
                role,
                permission_level,
                assigned_sections
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (subject) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                email = EXCLUDED.email,
                role = EXCLUDED.role,
                permission_level = EXCLUDED.permission_level,
                assigned_sections = EXCLUDED.assigned_sections,
                updated_at = now()
            "#,
        )
        .bind(profile.subject())
        .bind(profile.display_name())
        .bind(profile.email())
        .bind(profile.role().as_str())
        .bind(profile.permission_level().map(|level| level.as_str()))
        .bind(sections)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to save user profile '{}': {error}",
                profile.subject()
            ))
        })?;

        Ok(())
    }

    async fn delete_profile(&self, subject: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM user_profiles WHERE subject = $1")
            .bind(subject)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete user profile '{subject}': {error}"))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user '{subject}' does not exist")));
        }

        Ok(())
    }
}
