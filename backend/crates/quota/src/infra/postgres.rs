//! PostgreSQL Key-Value Store
//!
//! Durable [`KeyValueStore`] over the `kv_store` table.

use platform::kv::{KeyValueStore, KvError};
use sqlx::PgPool;

/// PostgreSQL-backed key-value store
#[derive(Clone)]
pub struct PgKeyValueStore {
    pool: PgPool,
}

impl PgKeyValueStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unavailable(err: sqlx::Error) -> KvError {
    KvError::Unavailable(err.to_string())
}

impl KeyValueStore for PgKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        sqlx::query_scalar::<_, String>("SELECT kv_value FROM kv_store WHERE kv_key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (kv_key, kv_value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (kv_key)
            DO UPDATE SET kv_value = EXCLUDED.kv_value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        sqlx::query("DELETE FROM kv_store WHERE kv_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;

        tracing::debug!(key = %key, "Key removed");
        Ok(())
    }
}
