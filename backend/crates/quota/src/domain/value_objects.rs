//! Domain Value Objects

use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

/// Generations left in the current period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    /// Paid tier
    Unbounded,
    Limited(u32),
}

impl Remaining {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Remaining::Limited(0))
    }

    /// Count for the wire, `None` when unbounded
    pub fn count(&self) -> Option<u32> {
        match self {
            Remaining::Unbounded => None,
            Remaining::Limited(n) => Some(*n),
        }
    }
}

/// Reset period: `"<UTC year>-<zero-based UTC month>"`, e.g. `"2025-0"` for January 2025.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PeriodKey(String);

impl PeriodKey {
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(format!("{}-{}", at.year(), at.month0()))
    }

    /// Wrap a stored marker as-is. Markers are compared, never parsed.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remaining count plus whether it has been resolved from storage yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaSnapshot {
    pub remaining: Remaining,
    pub ready: bool,
}

impl QuotaSnapshot {
    /// Before storage has answered. Permission must not be decided on this.
    pub fn pending(remaining: Remaining) -> Self {
        Self {
            remaining,
            ready: false,
        }
    }

    pub fn resolved(remaining: Remaining) -> Self {
        Self {
            remaining,
            ready: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_period_key_uses_zero_based_month() {
        let jan = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();
        assert_eq!(PeriodKey::from_datetime(jan).as_str(), "2025-0");

        let dec = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
        assert_eq!(PeriodKey::from_datetime(dec).as_str(), "2024-11");
    }

    #[test]
    fn test_period_changes_on_first_second_of_month() {
        let last = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        let first = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_ne!(PeriodKey::from_datetime(last), PeriodKey::from_datetime(first));
    }

    #[test]
    fn test_remaining() {
        assert!(Remaining::Limited(0).is_exhausted());
        assert!(!Remaining::Limited(1).is_exhausted());
        assert!(!Remaining::Unbounded.is_exhausted());
        assert_eq!(Remaining::Unbounded.count(), None);
        assert_eq!(Remaining::Limited(4).count(), Some(4));
    }
}
