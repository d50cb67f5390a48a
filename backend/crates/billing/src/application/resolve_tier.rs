//! Tier Resolution
//!
//! The subscription directory is the authority on a user's tier. Users with
//! no record are on the free tier.

use kernel::tier::UserTier;

use crate::domain::repository::SubscriptionRepository;
use crate::error::BillingResult;

pub async fn resolve_tier<S>(repo: &S, user_id: &str) -> BillingResult<UserTier>
where
    S: SubscriptionRepository + Sync,
{
    Ok(repo
        .find_by_user(user_id)
        .await?
        .map(|subscription| subscription.tier)
        .unwrap_or_default())
}
