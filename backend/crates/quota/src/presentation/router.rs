//! Quota Router

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    routing::{get, post},
};
use platform::kv::KeyValueStore;

use crate::domain::clock::Clock;
use crate::domain::image::ImageEditor;
use crate::domain::repository::TierSource;
use crate::presentation::handlers::{self, QuotaAppState};

/// Slack on top of the base64-inflated upload for the JSON envelope
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the quota router (`/quota`, `/generate`)
pub fn quota_router<K, C, E, T>(state: QuotaAppState<K, C, E, T>) -> Router
where
    K: KeyValueStore + Send + Sync + 'static,
    C: Clock + 'static,
    E: ImageEditor + Send + Sync + 'static,
    T: TierSource + Send + Sync + 'static,
{
    let body_limit = state.config.max_upload_bytes.div_ceil(3) * 4 + BODY_OVERHEAD_BYTES;

    Router::new()
        .route("/quota", get(handlers::get_quota::<K, C, E, T>))
        .route("/generate", post(handlers::generate::<K, C, E, T>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
