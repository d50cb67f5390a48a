//! Verified Identity Entity

use crate::domain::value_object::user_id::UserId;

/// Caller identity after the ID token passed verification.
///
/// Carries profile fields only. Whether the user pays is decided elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub user_id: UserId,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Avatar URL (`picture` claim)
    pub picture: Option<String>,
}

impl VerifiedIdentity {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
            name: None,
            picture: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name to show in logs and the UI
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or_else(|| self.user_id.as_str())
    }
}
