//! Tier lookup for quota decisions, answered by the billing directory.

use std::sync::Arc;

use billing::domain::repository::SubscriptionRepository;
use kernel::tier::UserTier;
use quota::{QuotaError, QuotaResult, TierSource};

pub struct SubscriptionTiers<S> {
    repo: Arc<S>,
}

impl<S> SubscriptionTiers<S> {
    pub fn new(repo: Arc<S>) -> Self {
        Self { repo }
    }
}

impl<S> TierSource for SubscriptionTiers<S>
where
    S: SubscriptionRepository + Send + Sync,
{
    async fn tier_for(&self, user_id: &str) -> QuotaResult<UserTier> {
        billing::resolve_tier(self.repo.as_ref(), user_id)
            .await
            .map_err(|e| QuotaError::TierUnavailable(e.to_string()))
    }
}
