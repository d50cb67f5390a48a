//! Caller identity as seen by the entitlement tracker.

use kernel::tier::UserTier;
use serde::Serialize;

/// Who is asking for a generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Not signed in; quota follows the device
    Anonymous,
    /// Signed in; `tier` comes from the subscription directory
    Registered { user_id: String, tier: UserTier },
}

impl Identity {
    pub fn registered(user_id: impl Into<String>, tier: UserTier) -> Self {
        Identity::Registered {
            user_id: user_id.into(),
            tier,
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, Identity::Registered { tier, .. } if tier.is_paid())
    }

    /// Counted class, `None` for paid identities which are never counted.
    pub fn class(&self) -> Option<QuotaClass> {
        match self {
            Identity::Anonymous => Some(QuotaClass::Anonymous),
            Identity::Registered { tier, .. } if tier.is_paid() => None,
            Identity::Registered { .. } => Some(QuotaClass::Free),
        }
    }

    /// Label for responses and logs
    pub fn label(&self) -> &'static str {
        match self {
            Identity::Anonymous => "anonymous",
            Identity::Registered { tier, .. } => tier.code(),
        }
    }
}

/// Counted identity class. Each class has its own storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaClass {
    Anonymous,
    Free,
}

impl QuotaClass {
    pub const ALL: [QuotaClass; 2] = [QuotaClass::Anonymous, QuotaClass::Free];

    pub const fn storage_key(&self) -> &'static str {
        match self {
            QuotaClass::Anonymous => "anonymous_quota",
            QuotaClass::Free => "user_quota",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_class() {
        assert_eq!(Identity::Anonymous.class(), Some(QuotaClass::Anonymous));
        assert_eq!(
            Identity::registered("u1", UserTier::Free).class(),
            Some(QuotaClass::Free)
        );
        assert_eq!(Identity::registered("u1", UserTier::Paid).class(), None);
    }

    #[test]
    fn test_storage_keys_are_distinct() {
        assert_ne!(
            QuotaClass::Anonymous.storage_key(),
            QuotaClass::Free.storage_key()
        );
    }
}
