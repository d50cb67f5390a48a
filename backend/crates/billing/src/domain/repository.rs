//! Repository Traits
//!
//! Interfaces for the subscription directory. Implementations are in
//! infrastructure layer.

use crate::domain::subscription::Subscription;
use crate::error::BillingResult;

#[trait_variant::make(SubscriptionRepository: Send)]
pub trait LocalSubscriptionRepository {
    async fn find_by_customer(&self, customer_id: &str) -> BillingResult<Option<Subscription>>;

    /// Most recently updated record linked to the user
    async fn find_by_user(&self, user_id: &str) -> BillingResult<Option<Subscription>>;

    async fn save(&self, subscription: &Subscription) -> BillingResult<()>;
}
