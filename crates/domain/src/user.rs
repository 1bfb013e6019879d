//! Church user accounts and their access attributes.

use std::collections::BTreeSet;

use ecclesia_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{PermissionLevel, Role, Section};

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: exactly one `@`, non-empty local
    /// part, and a domain containing at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || domain.contains('@') || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Stored user profile carrying the access attributes of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    subject: NonEmptyString,
    display_name: String,
    email: Option<EmailAddress>,
    role: Role,
    permission_level: Option<PermissionLevel>,
    #[serde(default)]
    assigned_sections: BTreeSet<Section>,
}

impl UserProfile {
    /// Creates a profile with the given role and no level or sections.
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        email: Option<String>,
        role: Role,
    ) -> AppResult<Self> {
        let subject = NonEmptyString::for_field("subject", subject)?;
        let display_name = display_name.into();
        let display_name = if display_name.trim().is_empty() {
            subject.as_str().to_owned()
        } else {
            display_name
        };

        Ok(Self {
            subject,
            display_name,
            email: email.map(EmailAddress::new).transpose()?,
            role,
            permission_level: None,
            assigned_sections: BTreeSet::new(),
        })
    }

    /// Returns the profile with a permission level set.
    #[must_use]
    pub fn with_permission_level(mut self, permission_level: Option<PermissionLevel>) -> Self {
        self.permission_level = permission_level;
        self
    }

    /// Returns the profile with the given assigned sections.
    #[must_use]
    pub fn with_assigned_sections(mut self, sections: impl IntoIterator<Item = Section>) -> Self {
        self.assigned_sections = sections.into_iter().collect();
        self
    }

    /// Replaces the access attributes, dropping sections for roles that ignore them.
    pub fn set_access(
        &mut self,
        role: Role,
        permission_level: Option<PermissionLevel>,
        assigned_sections: BTreeSet<Section>,
    ) {
        self.role = role;
        self.permission_level = permission_level;
        self.assigned_sections = if role == Role::DataPersonnel {
            assigned_sections
        } else {
            BTreeSet::new()
        };
    }

    /// Refreshes identity-provider claims.
    pub fn refresh_identity(
        &mut self,
        display_name: impl Into<String>,
        email: Option<String>,
    ) -> AppResult<()> {
        let display_name = display_name.into();
        if !display_name.trim().is_empty() {
            self.display_name = display_name;
        }
        self.email = email.map(EmailAddress::new).transpose()?;
        Ok(())
    }

    /// Returns the identity-provider subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email address, when known.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_ref().map(EmailAddress::as_str)
    }

    /// Returns the role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the permission level, when set.
    #[must_use]
    pub fn permission_level(&self) -> Option<PermissionLevel> {
        self.permission_level
    }

    /// Returns the assigned sections.
    #[must_use]
    pub fn assigned_sections(&self) -> &BTreeSet<Section> {
        &self.assigned_sections
    }
}
