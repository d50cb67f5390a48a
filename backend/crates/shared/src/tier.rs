//! Subscription tier of a registered user.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Registered users start on `Free`; only billing webhooks move them to `Paid`
/// and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserTier {
    #[default]
    Free,
    Paid,
}

impl UserTier {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            UserTier::Free => "free",
            UserTier::Paid => "paid",
        }
    }

    #[inline]
    pub const fn is_paid(&self) -> bool {
        matches!(self, UserTier::Paid)
    }

    /// Unknown codes yield `None`; callers decide the fallback.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "free" => Some(UserTier::Free),
            "paid" => Some(UserTier::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for UserTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(UserTier::from_code("free"), Some(UserTier::Free));
        assert_eq!(UserTier::from_code("paid"), Some(UserTier::Paid));
        assert_eq!(UserTier::from_code("gold"), None);
        assert_eq!(UserTier::Paid.to_string(), "paid");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&UserTier::Paid).unwrap();
        assert_eq!(json, r#""paid""#);
        let tier: UserTier = serde_json::from_str(r#""free""#).unwrap();
        assert_eq!(tier, UserTier::Free);
    }

    #[test]
    fn test_default_is_free() {
        assert_eq!(UserTier::default(), UserTier::Free);
        assert!(!UserTier::default().is_paid());
    }
}
