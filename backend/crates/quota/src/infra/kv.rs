//! Key-Value Quota Repository
//!
//! Stores quota records in a scoped key-value store:
//! `anonymous_quota`, `user_quota` and `last_reset_period`.

use platform::kv::{KeyValueStore, ScopedStore};

use crate::domain::identity::QuotaClass;
use crate::domain::repository::{PERIOD_KEY, QuotaRepository};
use crate::domain::services::parse_stored_count;
use crate::domain::value_objects::PeriodKey;
use crate::error::QuotaResult;

pub struct KvQuotaRepository<K> {
    store: ScopedStore<K>,
}

impl<K> KvQuotaRepository<K> {
    pub fn new(store: ScopedStore<K>) -> Self {
        Self { store }
    }
}

impl<K> QuotaRepository for KvQuotaRepository<K>
where
    K: KeyValueStore + Send + Sync,
{
    fn scope(&self) -> &str {
        self.store.scope()
    }

    async fn load_period(&self) -> QuotaResult<Option<PeriodKey>> {
        Ok(self.store.get(PERIOD_KEY).await?.map(PeriodKey::from_stored))
    }

    async fn save_period(&self, period: &PeriodKey) -> QuotaResult<()> {
        self.store.set(PERIOD_KEY, period.as_str()).await?;
        Ok(())
    }

    async fn load_remaining(&self, class: QuotaClass, allotment: u32) -> QuotaResult<Option<u32>> {
        let Some(raw) = self.store.get(class.storage_key()).await? else {
            return Ok(None);
        };

        let parsed = parse_stored_count(&raw, allotment);
        if parsed.is_none() {
            tracing::warn!(
                scope = %self.store.scope(),
                key = class.storage_key(),
                value = %raw,
                "Discarding corrupt quota record"
            );
        }
        Ok(parsed)
    }

    async fn save_remaining(&self, class: QuotaClass, remaining: u32) -> QuotaResult<()> {
        self.store
            .set(class.storage_key(), &remaining.to_string())
            .await?;
        Ok(())
    }

    async fn clear_remaining(&self, class: QuotaClass) -> QuotaResult<()> {
        self.store.remove(class.storage_key()).await?;
        Ok(())
    }
}
