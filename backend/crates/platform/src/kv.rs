//! Key-Value Storage Port
//!
//! String keys to string values, the same shape as browser `localStorage`.
//! Domain crates build their persisted layouts on top of this trait and use
//! [`MemoryKeyValueStore`] as the test fake.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Storage failures. Absent keys are not errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KvError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store trait
#[trait_variant::make(KeyValueStore: Send)]
pub trait LocalKeyValueStore {
    /// Read a value, `None` if the key was never written or was removed
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Insert or overwrite a value
    async fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// Remove a key; removing an absent key succeeds
    async fn remove(&self, key: &str) -> Result<(), KvError>;
}

/// Process-local store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous read for tests and diagnostics
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> KvError {
    KvError::Unavailable("in-memory store lock poisoned".to_string())
}

impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

/// View of a shared store restricted to one namespace.
///
/// Keys are stored as `<scope>/<key>`, so two scopes never see each other's
/// values even though they share the backing store.
#[derive(Debug)]
pub struct ScopedStore<K> {
    inner: Arc<K>,
    scope: String,
}

impl<K> Clone for ScopedStore<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            scope: self.scope.clone(),
        }
    }
}

impl<K> ScopedStore<K> {
    pub fn new(inner: Arc<K>, scope: impl Into<String>) -> Self {
        Self {
            inner,
            scope: scope.into(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Fully qualified key in the backing store
    pub fn qualify(&self, key: &str) -> String {
        format!("{}/{}", self.scope, key)
    }
}

impl<K> KeyValueStore for ScopedStore<K>
where
    K: KeyValueStore + Send + Sync,
{
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.inner.get(&self.qualify(key)).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.inner.set(&self.qualify(key), value).await
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        self.inner.remove(&self.qualify(key)).await
    }
}
