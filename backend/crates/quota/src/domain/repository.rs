//! Repository Traits
//!
//! Interfaces for persistence and tier lookup. Implementations are in
//! infrastructure layer or the composing binary.

use kernel::tier::UserTier;

use crate::domain::identity::QuotaClass;
use crate::domain::value_objects::PeriodKey;
use crate::error::QuotaResult;

/// Key of the period marker shared by all classes of one scope
pub const PERIOD_KEY: &str = "last_reset_period";

/// Quota records of one storage scope (one device or one user)
#[trait_variant::make(QuotaRepository: Send)]
pub trait LocalQuotaRepository {
    /// Scope name, used to key locks
    fn scope(&self) -> &str;

    async fn load_period(&self) -> QuotaResult<Option<PeriodKey>>;

    async fn save_period(&self, period: &PeriodKey) -> QuotaResult<()>;

    /// Stored count, `None` when absent, unreadable or above `allotment`
    async fn load_remaining(&self, class: QuotaClass, allotment: u32) -> QuotaResult<Option<u32>>;

    async fn save_remaining(&self, class: QuotaClass, remaining: u32) -> QuotaResult<()>;

    /// Drop the record of `class`. An absent record reads as a full allotment.
    async fn clear_remaining(&self, class: QuotaClass) -> QuotaResult<()>;
}

/// Authoritative tier of a registered user
#[trait_variant::make(TierSource: Send)]
pub trait LocalTierSource {
    async fn tier_for(&self, user_id: &str) -> QuotaResult<UserTier>;
}
