//! Routes owned by the binary: health and the caller's profile.

use std::sync::Arc;

use auth::application::profile_cache::ProfileCache;
use auth::{CurrentIdentity, UserProfile};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use billing::domain::repository::SubscriptionRepository;
use platform::kv::{KeyValueStore, ScopedStore};
use serde_json::{Value, json};

pub struct ProfileState<K, S> {
    pub store: Arc<K>,
    pub subscriptions: Arc<S>,
}

impl<K, S> Clone for ProfileState<K, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            subscriptions: self.subscriptions.clone(),
        }
    }
}

/// `/health` and `/me`
pub fn app_router<K, S>(state: ProfileState<K, S>) -> Router
where
    K: KeyValueStore + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/me", get(me::<K, S>))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/me
///
/// Caches the profile under the user's scope with the tier billing reports.
async fn me<K, S>(
    State(state): State<ProfileState<K, S>>,
    identity: CurrentIdentity,
) -> Result<Json<UserProfile>, Response>
where
    K: KeyValueStore + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let verified = identity.require().map_err(IntoResponse::into_response)?;
    let user_id = verified.user_id.as_str();

    let tier = billing::resolve_tier(state.subscriptions.as_ref(), user_id)
        .await
        .map_err(IntoResponse::into_response)?;

    let scoped = ScopedStore::new(state.store.clone(), format!("user:{}", user_id));
    let profile = ProfileCache::new(Arc::new(scoped))
        .sign_in(verified, tier)
        .await
        .map_err(IntoResponse::into_response)?;

    Ok(Json(profile))
}
