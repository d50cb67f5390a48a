//! User Profile Entity
//!
//! Profile cached for fast UI paint. Not authoritative for entitlements.

use kernel::tier::UserTier;
use serde::{Deserialize, Serialize};

use crate::domain::entity::identity::VerifiedIdentity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub tier: UserTier,
}

impl UserProfile {
    /// Profile for a fresh sign-in. Every new sign-in starts on the free tier.
    pub fn from_identity(identity: &VerifiedIdentity) -> Self {
        Self {
            id: identity.user_id.as_str().to_string(),
            name: identity.name.clone().unwrap_or_default(),
            email: identity.email.clone().unwrap_or_default(),
            avatar: identity.picture.clone().unwrap_or_default(),
            tier: UserTier::Free,
        }
    }

    pub fn with_tier(mut self, tier: UserTier) -> Self {
        self.tier = tier;
        self
    }
}
