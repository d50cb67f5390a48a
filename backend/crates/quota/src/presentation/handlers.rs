//! HTTP Handlers

use std::sync::Arc;

use auth::CurrentIdentity;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, header};
use kernel::id::DeviceId;
use platform::cookie::extract_cookie;
use platform::kv::{KeyValueStore, ScopedStore};
use platform::lock::KeyedLocks;
use tokio_util::sync::CancellationToken;

use crate::application::config::QuotaConfig;
use crate::application::generate::{GenerateInput, GenerateUseCase};
use crate::application::tracker::EntitlementTracker;
use crate::domain::clock::Clock;
use crate::domain::identity::Identity;
use crate::domain::image::ImageEditor;
use crate::domain::repository::TierSource;
use crate::error::QuotaResult;
use crate::infra::kv::KvQuotaRepository;
use crate::presentation::dto::{GenerateRequest, GenerateResponse, QuotaResponse};

/// Shared state for quota handlers
pub struct QuotaAppState<K, C, E, T>
where
    K: KeyValueStore,
    C: Clock,
    E: ImageEditor,
    T: TierSource,
{
    pub store: Arc<K>,
    pub clock: Arc<C>,
    pub editor: Arc<E>,
    pub tiers: Arc<T>,
    pub config: Arc<QuotaConfig>,
    pub locks: KeyedLocks,
}

impl<K, C, E, T> Clone for QuotaAppState<K, C, E, T>
where
    K: KeyValueStore,
    C: Clock,
    E: ImageEditor,
    T: TierSource,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: self.clock.clone(),
            editor: self.editor.clone(),
            tiers: self.tiers.clone(),
            config: self.config.clone(),
            locks: self.locks.clone(),
        }
    }
}

impl<K, C, E, T> QuotaAppState<K, C, E, T>
where
    K: KeyValueStore + Send + Sync + 'static,
    C: Clock + 'static,
    E: ImageEditor + Send + Sync + 'static,
    T: TierSource + Send + Sync + 'static,
{
    fn tracker(&self, scope: &str) -> EntitlementTracker<KvQuotaRepository<K>, C> {
        let repo = KvQuotaRepository::new(ScopedStore::new(self.store.clone(), scope));
        EntitlementTracker::new(
            Arc::new(repo),
            self.clock.clone(),
            self.config.clone(),
            self.locks.clone(),
        )
    }

    /// Identity, storage scope and, for new devices, the cookie to set.
    async fn resolve_caller(
        &self,
        current: &CurrentIdentity,
        headers: &HeaderMap,
    ) -> QuotaResult<Caller> {
        if let Some(verified) = current.get() {
            let user_id = verified.user_id.as_str();
            let tier = self.tiers.tier_for(user_id).await?;
            return Ok(Caller {
                identity: Identity::registered(user_id, tier),
                scope: format!("user:{}", user_id),
                response_headers: HeaderMap::new(),
                new_device: false,
            });
        }

        let cookie = &self.config.device_cookie;
        let existing =
            extract_cookie(headers, &cookie.name).and_then(|value| value.parse::<DeviceId>().ok());

        let mut response_headers = HeaderMap::new();
        let new_device = existing.is_none();
        let device = match existing {
            Some(device) => device,
            None => {
                let device = DeviceId::new();
                if let Some(value) = cookie.set_cookie_header(&device.to_string()) {
                    response_headers.insert(header::SET_COOKIE, value);
                }
                tracing::debug!(device = %device, "Minted device id");
                device
            }
        };

        Ok(Caller {
            identity: Identity::Anonymous,
            scope: format!("device:{}", device),
            response_headers,
            new_device,
        })
    }
}

struct Caller {
    identity: Identity,
    scope: String,
    response_headers: HeaderMap<HeaderValue>,
    /// Device id minted on this request
    new_device: bool,
}

/// GET /api/quota
pub async fn get_quota<K, C, E, T>(
    State(state): State<QuotaAppState<K, C, E, T>>,
    identity: CurrentIdentity,
    headers: HeaderMap,
) -> QuotaResult<(HeaderMap, Json<QuotaResponse>)>
where
    K: KeyValueStore + Send + Sync + 'static,
    C: Clock + 'static,
    E: ImageEditor + Send + Sync + 'static,
    T: TierSource + Send + Sync + 'static,
{
    let caller = state.resolve_caller(&identity, &headers).await?;
    let tracker = state.tracker(&caller.scope);
    // a device that was just minted has no record; do not create one for a read
    let snapshot = if caller.new_device {
        tracker.preview(&caller.identity).await?
    } else {
        tracker.initialize(&caller.identity).await?
    };

    Ok((
        caller.response_headers,
        Json(QuotaResponse::new(
            snapshot.remaining,
            snapshot.ready,
            caller.identity.label(),
        )),
    ))
}

/// POST /api/generate
pub async fn generate<K, C, E, T>(
    State(state): State<QuotaAppState<K, C, E, T>>,
    identity: CurrentIdentity,
    headers: HeaderMap,
    Json(req): Json<GenerateRequest>,
) -> QuotaResult<(HeaderMap, Json<GenerateResponse>)>
where
    K: KeyValueStore + Send + Sync + 'static,
    C: Clock + 'static,
    E: ImageEditor + Send + Sync + 'static,
    T: TierSource + Send + Sync + 'static,
{
    let caller = state.resolve_caller(&identity, &headers).await?;

    // a dropped request cancels the token, so a late result is not charged
    let cancel = CancellationToken::new();
    let _abandon_on_drop = cancel.clone().drop_guard();

    let use_case = GenerateUseCase::new(
        state.tracker(&caller.scope),
        state.editor.clone(),
        state.locks.clone(),
    );

    let output = use_case
        .execute(
            caller.identity,
            GenerateInput {
                image_b64: req.image_b64,
                mime_type: req.mime_type,
            },
            &cancel,
        )
        .await?;

    Ok((
        caller.response_headers,
        Json(GenerateResponse {
            image_b64: output.image_b64,
            text: output.text,
            remaining: output.remaining.count(),
            unlimited: output.remaining.count().is_none(),
            watermark: output.watermark,
        }),
    ))
}
