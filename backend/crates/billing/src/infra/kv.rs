//! Key-Value Subscription Repository
//!
//! Records live under `customer:<id>` as JSON, with a `user:<id>` index
//! pointing at the customer last linked to that user.

use std::sync::Arc;

use platform::kv::{KeyValueStore, ScopedStore};

use crate::domain::repository::SubscriptionRepository;
use crate::domain::subscription::Subscription;
use crate::error::{BillingError, BillingResult};

pub const SCOPE: &str = "billing";

pub struct KvSubscriptionRepository<K> {
    store: ScopedStore<K>,
}

impl<K> KvSubscriptionRepository<K> {
    pub fn new(store: Arc<K>) -> Self {
        Self {
            store: ScopedStore::new(store, SCOPE),
        }
    }
}

fn customer_key(customer_id: &str) -> String {
    format!("customer:{}", customer_id)
}

fn user_key(user_id: &str) -> String {
    format!("user:{}", user_id)
}

impl<K> SubscriptionRepository for KvSubscriptionRepository<K>
where
    K: KeyValueStore + Send + Sync,
{
    async fn find_by_customer(&self, customer_id: &str) -> BillingResult<Option<Subscription>> {
        let Some(raw) = self.store.get(&customer_key(customer_id)).await? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| {
                BillingError::Internal(format!(
                    "corrupt subscription record {}: {}",
                    customer_id, e
                ))
            })
    }

    async fn find_by_user(&self, user_id: &str) -> BillingResult<Option<Subscription>> {
        let Some(customer_id) = self.store.get(&user_key(user_id)).await? else {
            return Ok(None);
        };
        self.find_by_customer(&customer_id).await
    }

    async fn save(&self, subscription: &Subscription) -> BillingResult<()> {
        let json = serde_json::to_string(subscription)
            .map_err(|e| BillingError::Internal(e.to_string()))?;
        self.store
            .set(&customer_key(&subscription.customer_id), &json)
            .await?;

        if let Some(user_id) = &subscription.user_id {
            self.store
                .set(&user_key(user_id), &subscription.customer_id)
                .await?;
        }
        Ok(())
    }
}
