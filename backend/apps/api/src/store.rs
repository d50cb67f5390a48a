//! Backing store selection
//!
//! Postgres when `DATABASE_URL` is set, process memory otherwise.

use platform::kv::{KeyValueStore, KvError, MemoryKeyValueStore};
use quota::PgKeyValueStore;

pub enum AppStore {
    Memory(MemoryKeyValueStore),
    Postgres(PgKeyValueStore),
}

impl AppStore {
    pub fn backend(&self) -> &'static str {
        match self {
            AppStore::Memory(_) => "memory",
            AppStore::Postgres(_) => "postgres",
        }
    }
}

impl KeyValueStore for AppStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        match self {
            AppStore::Memory(store) => store.get(key).await,
            AppStore::Postgres(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        match self {
            AppStore::Memory(store) => store.set(key, value).await,
            AppStore::Postgres(store) => store.set(key, value).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        match self {
            AppStore::Memory(store) => store.remove(key).await,
            AppStore::Postgres(store) => store.remove(key).await,
        }
    }
}
