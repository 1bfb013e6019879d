use serde::{Deserialize, Serialize};

/// Authenticated caller identity persisted in the session.
///
/// The identity is asserted by the upstream identity provider and trusted as
/// handed over; role and section grants are resolved separately per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    display_name: String,
    email: Option<String>,
}

impl UserIdentity {
    /// Creates a user identity from identity-provider claims.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            email,
        }
    }

    /// Returns the stable subject claim from the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}
