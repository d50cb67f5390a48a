//! Unit tests for Quota crate

#[cfg(test)]
mod fakes {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use kernel::tier::UserTier;
    use platform::kv::{MemoryKeyValueStore, ScopedStore};
    use platform::lock::KeyedLocks;
    use tokio_util::sync::CancellationToken;

    use crate::application::config::QuotaConfig;
    use crate::application::tracker::EntitlementTracker;
    use crate::domain::clock::FixedClock;
    use crate::domain::image::{EditResponse, ImageEditor, SourceImage};
    use crate::domain::repository::TierSource;
    use crate::error::{QuotaError, QuotaResult};
    use crate::infra::kv::KvQuotaRepository;

    pub type MemoryTracker = EntitlementTracker<KvQuotaRepository<MemoryKeyValueStore>, FixedClock>;

    pub const PNG_B64: &str = "iVBORw0KGgo=";

    pub fn tracker_with(
        store: &Arc<MemoryKeyValueStore>,
        clock: &FixedClock,
        scope: &str,
        config: QuotaConfig,
        locks: &KeyedLocks,
    ) -> MemoryTracker {
        let repo = KvQuotaRepository::new(ScopedStore::new(store.clone(), scope));
        EntitlementTracker::new(
            Arc::new(repo),
            Arc::new(clock.clone()),
            Arc::new(config),
            locks.clone(),
        )
    }

    pub fn tracker(store: &Arc<MemoryKeyValueStore>, clock: &FixedClock, scope: &str) -> MemoryTracker {
        tracker_with(store, clock, scope, QuotaConfig::default(), &KeyedLocks::new())
    }

    pub enum EditBehavior {
        Image,
        NoImage,
        Fail,
        /// Caller gives up while the service is still working, then the image arrives
        CancelThenImage(CancellationToken),
    }

    pub struct FakeEditor {
        pub behavior: EditBehavior,
        pub calls: AtomicUsize,
    }

    impl FakeEditor {
        pub fn new(behavior: EditBehavior) -> Self {
            Self {
                behavior,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ImageEditor for FakeEditor {
        async fn edit(&self, _image: &SourceImage) -> QuotaResult<EditResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                EditBehavior::Image => Ok(EditResponse {
                    image_b64: Some("ZWRpdGVk".to_string()),
                    text: Some("Blessed".to_string()),
                }),
                EditBehavior::NoImage => Ok(EditResponse {
                    image_b64: None,
                    text: Some("blocked for safety".to_string()),
                }),
                EditBehavior::Fail => Err(QuotaError::UpstreamFailure("connection reset".to_string())),
                EditBehavior::CancelThenImage(token) => {
                    token.cancel();
                    Ok(EditResponse {
                        image_b64: Some("ZWRpdGVk".to_string()),
                        text: None,
                    })
                }
            }
        }
    }

    /// Users listed in `paid` are paid, everyone else free
    #[derive(Default)]
    pub struct StaticTiers {
        pub paid: Vec<String>,
    }

    impl TierSource for StaticTiers {
        async fn tier_for(&self, user_id: &str) -> QuotaResult<UserTier> {
            if self.paid.iter().any(|paid| paid == user_id) {
                Ok(UserTier::Paid)
            } else {
                Ok(UserTier::Free)
            }
        }
    }
}

#[cfg(test)]
mod tracker_tests {
    use std::sync::Arc;

    use kernel::tier::UserTier;
    use platform::kv::{KeyValueStore, MemoryKeyValueStore};
    use platform::lock::KeyedLocks;

    use super::fakes::*;
    use crate::application::config::QuotaConfig;
    use crate::domain::clock::FixedClock;
    use crate::domain::identity::Identity;
    use crate::domain::value_objects::Remaining;

    fn free() -> Identity {
        Identity::registered("sub-1", UserTier::Free)
    }

    #[tokio::test]
    async fn test_paid_never_touches_storage() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let clock = FixedClock::new("2025-0");
        let tracker = tracker(&store, &clock, "user:sub-9");
        let paid = Identity::registered("sub-9", UserTier::Paid);

        let snapshot = tracker.initialize(&paid).await.unwrap();
        assert_eq!(snapshot.remaining, Remaining::Unbounded);
        assert!(snapshot.ready);

        for _ in 0..10 {
            assert!(tracker.may_proceed(&paid, Remaining::Limited(0)));
            assert_eq!(tracker.decrement(&paid).await.unwrap(), Remaining::Unbounded);
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_runs_out_after_three() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let clock = FixedClock::new("2025-0");
        let tracker = tracker(&store, &clock, "device:a");

        let snapshot = tracker.initialize(&Identity::Anonymous).await.unwrap();
        assert_eq!(snapshot.remaining, Remaining::Limited(3));

        let mut remaining = snapshot.remaining;
        for _ in 0..3 {
            remaining = tracker.decrement(&Identity::Anonymous).await.unwrap();
        }
        assert_eq!(remaining, Remaining::Limited(0));
        assert!(!tracker.may_proceed(&Identity::Anonymous, remaining));

        // floors at zero
        let remaining = tracker.decrement(&Identity::Anonymous).await.unwrap();
        assert_eq!(remaining, Remaining::Limited(0));
        assert_eq!(store.peek("device:a/anonymous_quota").as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_free_remaining_after_n_decrements() {
        for n in 0..8u32 {
            let store = Arc::new(MemoryKeyValueStore::new());
            let clock = FixedClock::new("2025-0");
            let tracker = tracker(&store, &clock, "user:sub-1");

            tracker.initialize(&free()).await.unwrap();
            for _ in 0..n {
                tracker.decrement(&free()).await.unwrap();
            }

            let snapshot = tracker.initialize(&free()).await.unwrap();
            assert_eq!(snapshot.remaining, Remaining::Limited(5u32.saturating_sub(n)));
        }
    }

    #[tokio::test]
    async fn test_same_period_keeps_stored_value() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set("user:sub-1/last_reset_period", "2025-1").await.unwrap();
        store.set("user:sub-1/user_quota", "2").await.unwrap();

        let clock = FixedClock::new("2025-1");
        let snapshot = tracker(&store, &clock, "user:sub-1")
            .initialize(&free())
            .await
            .unwrap();
        assert_eq!(snapshot.remaining, Remaining::Limited(2));
    }

    #[tokio::test]
    async fn test_new_period_resets_free_quota() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set("user:sub-1/last_reset_period", "2025-0").await.unwrap();
        store.set("user:sub-1/user_quota", "1").await.unwrap();

        let clock = FixedClock::new("2025-1");
        let snapshot = tracker(&store, &clock, "user:sub-1")
            .initialize(&free())
            .await
            .unwrap();

        assert_eq!(snapshot.remaining, Remaining::Limited(5));
        assert_eq!(
            store.peek("user:sub-1/last_reset_period").as_deref(),
            Some("2025-1")
        );
        assert_eq!(store.peek("user:sub-1/user_quota").as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn test_rollover_between_calls() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let clock = FixedClock::new("2024-1");
        let tracker = tracker(&store, &clock, "device:a");

        tracker.initialize(&Identity::Anonymous).await.unwrap();
        tracker.decrement(&Identity::Anonymous).await.unwrap();
        tracker.decrement(&Identity::Anonymous).await.unwrap();

        clock.set("2024-2");
        // the reset is applied before the decrement is observed
        let remaining = tracker.decrement(&Identity::Anonymous).await.unwrap();
        assert_eq!(remaining, Remaining::Limited(2));
        assert_eq!(store.peek("device:a/last_reset_period").as_deref(), Some("2024-2"));
    }

    #[tokio::test]
    async fn test_classes_are_independent() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let clock = FixedClock::new("2025-0");
        let tracker = tracker(&store, &clock, "shared");

        tracker.initialize(&Identity::Anonymous).await.unwrap();
        tracker.initialize(&free()).await.unwrap();

        tracker.decrement(&Identity::Anonymous).await.unwrap();
        tracker.decrement(&Identity::Anonymous).await.unwrap();

        assert_eq!(store.peek("shared/anonymous_quota").as_deref(), Some("1"));
        assert_eq!(store.peek("shared/user_quota").as_deref(), Some("5"));

        tracker.decrement(&free()).await.unwrap();
        assert_eq!(store.peek("shared/anonymous_quota").as_deref(), Some("1"));
        assert_eq!(store.peek("shared/user_quota").as_deref(), Some("4"));
    }

    #[tokio::test]
    async fn test_corrupt_value_is_replaced() {
        // above the allotment is as unusable as garbage
        for raw in ["abc", "-2", "", "4", "4294967295"] {
            let store = Arc::new(MemoryKeyValueStore::new());
            store.set("device:a/last_reset_period", "2025-0").await.unwrap();
            store.set("device:a/anonymous_quota", raw).await.unwrap();

            let clock = FixedClock::new("2025-0");
            let snapshot = tracker(&store, &clock, "device:a")
                .initialize(&Identity::Anonymous)
                .await
                .unwrap();

            assert_eq!(snapshot.remaining, Remaining::Limited(3));
            assert_eq!(store.peek("device:a/anonymous_quota").as_deref(), Some("3"));
        }
    }

    #[tokio::test]
    async fn test_reset_writes_only_the_resolved_class() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set("shared/last_reset_period", "2024-1").await.unwrap();
        store.set("shared/anonymous_quota", "0").await.unwrap();
        store.set("shared/user_quota", "2").await.unwrap();

        let clock = FixedClock::new("2024-2");
        let tracker = tracker(&store, &clock, "shared");
        let snapshot = tracker.initialize(&Identity::Anonymous).await.unwrap();

        assert_eq!(snapshot.remaining, Remaining::Limited(3));
        assert_eq!(store.peek("shared/anonymous_quota").as_deref(), Some("3"));
        assert_eq!(store.peek("shared/user_quota"), None);
        assert_eq!(store.len(), 2);

        // the dropped class still restarts at its allotment
        let free = tracker.initialize(&free()).await.unwrap();
        assert_eq!(free.remaining, Remaining::Limited(5));
    }

    #[tokio::test]
    async fn test_preview_writes_nothing() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let clock = FixedClock::new("2025-0");
        let tracker = tracker(&store, &clock, "device:a");

        let snapshot = tracker.preview(&Identity::Anonymous).await.unwrap();
        assert_eq!(snapshot.remaining, Remaining::Limited(3));
        assert!(snapshot.ready);
        assert!(store.is_empty());

        tracker.decrement(&Identity::Anonymous).await.unwrap();
        assert_eq!(store.len(), 2);

        // stale marker: reads as a fresh allotment, storage keeps the old values
        clock.set("2025-1");
        let snapshot = tracker.preview(&Identity::Anonymous).await.unwrap();
        assert_eq!(snapshot.remaining, Remaining::Limited(3));
        assert_eq!(store.peek("device:a/anonymous_quota").as_deref(), Some("2"));
        assert_eq!(store.peek("device:a/last_reset_period").as_deref(), Some("2025-0"));
    }

    #[tokio::test]
    async fn test_scopes_do_not_share_records() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let clock = FixedClock::new("2025-0");

        tracker(&store, &clock, "device:a")
            .decrement(&Identity::Anonymous)
            .await
            .unwrap();

        let other = tracker(&store, &clock, "device:b")
            .initialize(&Identity::Anonymous)
            .await
            .unwrap();
        assert_eq!(other.remaining, Remaining::Limited(3));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_decrements_are_serialized() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let clock = FixedClock::new("2025-0");
        let config = QuotaConfig {
            free_allotment: 40,
            ..QuotaConfig::default()
        };
        let tracker = Arc::new(tracker_with(
            &store,
            &clock,
            "user:sub-1",
            config,
            &KeyedLocks::new(),
        ));
        tracker.initialize(&free()).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..25 {
            let tracker = tracker.clone();
            tasks.push(tokio::spawn(async move {
                tracker.decrement(&free()).await.unwrap()
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.peek("user:sub-1/user_quota").as_deref(), Some("15"));
    }
}

#[cfg(test)]
mod session_tests {
    use std::sync::Arc;

    use kernel::tier::UserTier;
    use platform::kv::MemoryKeyValueStore;

    use super::fakes::*;
    use crate::application::session::QuotaSession;
    use crate::domain::clock::FixedClock;
    use crate::domain::identity::{Identity, QuotaClass};
    use crate::domain::value_objects::Remaining;
    use crate::error::QuotaError;

    #[tokio::test]
    async fn test_not_ready_before_load() {
        let session = QuotaSession::pending(Identity::Anonymous);
        assert!(!session.snapshot().ready);
        assert!(matches!(
            session.check_permission(),
            Err(QuotaError::NotReady)
        ));

        // paid identities wait for readiness too
        let paid = QuotaSession::pending(Identity::registered("u", UserTier::Paid));
        assert!(matches!(paid.check_permission(), Err(QuotaError::NotReady)));
    }

    #[tokio::test]
    async fn test_exhausted_names_the_class() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let clock = FixedClock::new("2025-0");
        let tracker = tracker(&store, &clock, "device:a");

        for _ in 0..3 {
            tracker.decrement(&Identity::Anonymous).await.unwrap();
        }

        let mut session = QuotaSession::pending(Identity::Anonymous);
        session.load(&tracker).await.unwrap();
        assert!(matches!(
            session.check_permission(),
            Err(QuotaError::QuotaExhausted(QuotaClass::Anonymous))
        ));
    }

    #[tokio::test]
    async fn test_sign_in_does_not_carry_count_over() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let clock = FixedClock::new("2025-0");
        let tracker = tracker(&store, &clock, "shared");

        let mut session = QuotaSession::pending(Identity::Anonymous);
        session.load(&tracker).await.unwrap();
        for _ in 0..3 {
            session.record_success(&tracker).await.unwrap();
        }
        assert_eq!(session.snapshot().remaining, Remaining::Limited(0));

        let snapshot = session
            .switch_identity(Identity::registered("sub-1", UserTier::Free), &tracker)
            .await
            .unwrap();
        assert_eq!(snapshot.remaining, Remaining::Limited(5));
        assert!(snapshot.ready);
        assert!(session.check_permission().is_ok());
    }
}

#[cfg(test)]
mod generate_tests {
    use std::sync::Arc;

    use kernel::tier::UserTier;
    use platform::kv::MemoryKeyValueStore;
    use platform::lock::KeyedLocks;
    use tokio_util::sync::CancellationToken;

    use super::fakes::*;
    use crate::application::config::QuotaConfig;
    use crate::application::generate::{GenerateInput, GenerateUseCase};
    use crate::domain::clock::FixedClock;
    use crate::domain::identity::{Identity, QuotaClass};
    use crate::domain::value_objects::Remaining;
    use crate::error::QuotaError;

    struct Harness {
        store: Arc<MemoryKeyValueStore>,
        clock: FixedClock,
        locks: KeyedLocks,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: Arc::new(MemoryKeyValueStore::new()),
                clock: FixedClock::new("2025-0"),
                locks: KeyedLocks::new(),
            }
        }

        fn use_case(
            &self,
            editor: Arc<FakeEditor>,
        ) -> GenerateUseCase<
            crate::infra::kv::KvQuotaRepository<MemoryKeyValueStore>,
            FixedClock,
            FakeEditor,
        > {
            let tracker = tracker_with(
                &self.store,
                &self.clock,
                "device:a",
                QuotaConfig::default(),
                &self.locks,
            );
            GenerateUseCase::new(tracker, editor, self.locks.clone())
        }

        async fn remaining(&self) -> Remaining {
            tracker(&self.store, &self.clock, "device:a")
                .initialize(&Identity::Anonymous)
                .await
                .unwrap()
                .remaining
        }
    }

    fn png() -> GenerateInput {
        GenerateInput {
            image_b64: PNG_B64.to_string(),
            mime_type: "image/png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_success_spends_one() {
        let h = Harness::new();
        let editor = Arc::new(FakeEditor::new(EditBehavior::Image));

        let output = h
            .use_case(editor.clone())
            .execute(Identity::Anonymous, png(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output.image_b64, "ZWRpdGVk");
        assert_eq!(output.text.as_deref(), Some("Blessed"));
        assert_eq!(output.remaining, Remaining::Limited(2));
        assert!(output.watermark);
        assert_eq!(editor.calls(), 1);
        assert_eq!(h.remaining().await, Remaining::Limited(2));
    }

    #[tokio::test]
    async fn test_no_image_does_not_spend() {
        let h = Harness::new();
        let before = h.remaining().await;

        let err = h
            .use_case(Arc::new(FakeEditor::new(EditBehavior::NoImage)))
            .execute(Identity::Anonymous, png(), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            QuotaError::NoImageReturned(text) => {
                assert_eq!(text.as_deref(), Some("blocked for safety"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(h.remaining().await, before);
    }

    #[tokio::test]
    async fn test_upstream_failure_does_not_spend() {
        let h = Harness::new();
        let err = h
            .use_case(Arc::new(FakeEditor::new(EditBehavior::Fail)))
            .execute(Identity::Anonymous, png(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, QuotaError::UpstreamFailure(_)));
        // a generation that was never spent leaves no record behind
        assert!(h.store.is_empty());
        assert_eq!(h.remaining().await, Remaining::Limited(3));
    }

    #[tokio::test]
    async fn test_cancelled_before_call() {
        let h = Harness::new();
        let editor = Arc::new(FakeEditor::new(EditBehavior::Image));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = h
            .use_case(editor.clone())
            .execute(Identity::Anonymous, png(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, QuotaError::Abandoned));
        assert_eq!(editor.calls(), 0);
        assert_eq!(h.remaining().await, Remaining::Limited(3));
    }

    #[tokio::test]
    async fn test_late_success_after_abandon_is_not_charged() {
        let h = Harness::new();
        let cancel = CancellationToken::new();
        let editor = Arc::new(FakeEditor::new(EditBehavior::CancelThenImage(cancel.clone())));

        let err = h
            .use_case(editor.clone())
            .execute(Identity::Anonymous, png(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, QuotaError::Abandoned));
        assert_eq!(editor.calls(), 1);
        assert_eq!(h.remaining().await, Remaining::Limited(3));
    }

    #[tokio::test]
    async fn test_second_generation_while_in_flight() {
        let h = Harness::new();
        let editor = Arc::new(FakeEditor::new(EditBehavior::Image));
        let _outstanding = h.locks.try_lock("device:a/generate").unwrap();

        let err = h
            .use_case(editor.clone())
            .execute(Identity::Anonymous, png(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, QuotaError::GenerationInFlight));
        assert_eq!(editor.calls(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_quota_blocks_call() {
        let h = Harness::new();
        let editor = Arc::new(FakeEditor::new(EditBehavior::Image));
        for _ in 0..3 {
            h.use_case(editor.clone())
                .execute(Identity::Anonymous, png(), &CancellationToken::new())
                .await
                .unwrap();
        }

        let err = h
            .use_case(editor.clone())
            .execute(Identity::Anonymous, png(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            QuotaError::QuotaExhausted(QuotaClass::Anonymous)
        ));
        assert_eq!(editor.calls(), 3);
    }

    #[tokio::test]
    async fn test_paid_is_unbounded_without_watermark() {
        let h = Harness::new();
        let output = h
            .use_case(Arc::new(FakeEditor::new(EditBehavior::Image)))
            .execute(
                Identity::registered("sub-9", UserTier::Paid),
                png(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(output.remaining, Remaining::Unbounded);
        assert!(!output.watermark);
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_upload_never_reaches_service() {
        let h = Harness::new();
        let editor = Arc::new(FakeEditor::new(EditBehavior::Image));

        let err = h
            .use_case(editor.clone())
            .execute(
                Identity::Anonymous,
                GenerateInput {
                    image_b64: String::new(),
                    mime_type: "image/png".to_string(),
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, QuotaError::EmptyUpload));
        assert_eq!(editor.calls(), 0);
        assert!(h.store.is_empty());
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use auth::{CurrentIdentity, UserId, VerifiedIdentity};
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use platform::kv::{KeyValueStore, MemoryKeyValueStore};
    use platform::lock::KeyedLocks;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::fakes::*;
    use crate::application::config::QuotaConfig;
    use crate::domain::clock::FixedClock;
    use crate::presentation::handlers::QuotaAppState;
    use crate::presentation::router::quota_router;

    const DEVICE: &str = "6f9619ff-8b86-d011-b42d-00c04fc964ff";

    fn app(store: Arc<MemoryKeyValueStore>, behavior: EditBehavior) -> Router {
        quota_router(QuotaAppState {
            store,
            clock: Arc::new(FixedClock::new("2025-0")),
            editor: Arc::new(FakeEditor::new(behavior)),
            tiers: Arc::new(StaticTiers {
                paid: vec!["sub-paid".to_string()],
            }),
            config: Arc::new(QuotaConfig::development()),
            locks: KeyedLocks::new(),
        })
    }

    fn signed_in(sub: &str) -> CurrentIdentity {
        CurrentIdentity(Some(VerifiedIdentity::new(UserId::new(sub).unwrap())))
    }

    fn get_quota(cookie: Option<&str>, identity: Option<CurrentIdentity>) -> Request<Body> {
        let mut builder = Request::builder().uri("/quota");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        if let Some(identity) = identity {
            req.extensions_mut().insert(identity);
        }
        req
    }

    fn post_generate(image_b64: &str, identity: Option<CurrentIdentity>) -> Request<Body> {
        let body = serde_json::json!({ "imageB64": image_b64, "mimeType": "image/png" });
        let mut req = Request::builder()
            .method("POST")
            .uri("/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, format!("tf_device={DEVICE}"))
            .body(Body::from(body.to_string()))
            .unwrap();
        if let Some(identity) = identity {
            req.extensions_mut().insert(identity);
        }
        req
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_new_device_gets_cookie_and_trial() {
        let response = app(Arc::new(MemoryKeyValueStore::new()), EditBehavior::Image)
            .oneshot(get_quota(None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("tf_device="));
        assert!(cookie.contains("HttpOnly"));

        let body = json_body(response).await;
        assert_eq!(body["remaining"], 3);
        assert_eq!(body["unlimited"], false);
        assert_eq!(body["ready"], true);
        assert_eq!(body["tier"], "anonymous");
    }

    #[tokio::test]
    async fn test_known_device_keeps_its_count() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let router = app(store.clone(), EditBehavior::Image);

        let response = router
            .clone()
            .oneshot(post_generate(PNG_B64, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = json_body(response).await;
        assert_eq!(body["imageB64"], "ZWRpdGVk");
        assert_eq!(body["remaining"], 2);
        assert_eq!(body["watermark"], true);

        let response = router
            .oneshot(get_quota(Some(&format!("tf_device={DEVICE}")), None))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["remaining"], 2);
        assert_eq!(
            store.peek(&format!("device:{DEVICE}/anonymous_quota")).as_deref(),
            Some("2")
        );
        // a device only ever holds its own class and the period marker
        assert_eq!(store.peek(&format!("device:{DEVICE}/user_quota")), None);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_signed_in_free_user() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let response = app(store.clone(), EditBehavior::Image)
            .oneshot(get_quota(None, Some(signed_in("sub-1"))))
            .await
            .unwrap();

        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = json_body(response).await;
        assert_eq!(body["remaining"], 5);
        assert_eq!(body["tier"], "free");
        assert_eq!(store.peek("user:sub-1/user_quota").as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn test_paid_user_is_unlimited() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let response = app(store.clone(), EditBehavior::Image)
            .oneshot(post_generate(PNG_B64, Some(signed_in("sub-paid"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["remaining"], Value::Null);
        assert_eq!(body["unlimited"], true);
        assert_eq!(body["watermark"], false);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_anonymous_is_told_to_sign_in() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let scope = format!("device:{DEVICE}");
        store
            .set(&format!("{scope}/last_reset_period"), "2025-0")
            .await
            .unwrap();
        store
            .set(&format!("{scope}/anonymous_quota"), "0")
            .await
            .unwrap();

        let response = app(store, EditBehavior::Image)
            .oneshot(post_generate(PNG_B64, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = json_body(response).await;
        assert_eq!(body["action"], "Please sign in for more.");
    }

    #[tokio::test]
    async fn test_exhausted_free_user_is_told_to_subscribe() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store
            .set("user:sub-1/last_reset_period", "2025-0")
            .await
            .unwrap();
        store.set("user:sub-1/user_quota", "0").await.unwrap();

        let response = app(store, EditBehavior::Image)
            .oneshot(post_generate(PNG_B64, Some(signed_in("sub-1"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        let body = json_body(response).await;
        assert_eq!(body["action"], "Please subscribe for more.");
    }

    #[tokio::test]
    async fn test_empty_upload() {
        let response = app(Arc::new(MemoryKeyValueStore::new()), EditBehavior::Image)
            .oneshot(post_generate("", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["detail"], "Please upload an image first.");
    }

    #[tokio::test]
    async fn test_no_image_is_bad_gateway() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let response = app(store.clone(), EditBehavior::NoImage)
            .oneshot(post_generate(PNG_B64, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_cookieless_reads_store_nothing() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let router = app(store.clone(), EditBehavior::Image);

        for _ in 0..100 {
            let response = router.clone().oneshot(get_quota(None, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().get(header::SET_COOKIE).is_some());
            assert_eq!(json_body(response).await["remaining"], 3);
        }

        assert!(store.is_empty());
    }
}

#[cfg(test)]
mod error_tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use platform::kv::KvError;

    use crate::domain::identity::QuotaClass;
    use crate::error::*;

    #[test]
    fn test_error_into_response_status_codes() {
        let test_cases: Vec<(QuotaError, StatusCode)> = vec![
            (QuotaError::EmptyUpload, StatusCode::BAD_REQUEST),
            (
                QuotaError::UnsupportedMediaType("image/gif".into()),
                StatusCode::BAD_REQUEST,
            ),
            (QuotaError::InvalidImage, StatusCode::BAD_REQUEST),
            (
                QuotaError::ImageTooLarge { limit_mib: 4 },
                StatusCode::BAD_REQUEST,
            ),
            (
                QuotaError::QuotaExhausted(QuotaClass::Anonymous),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                QuotaError::QuotaExhausted(QuotaClass::Free),
                StatusCode::PAYMENT_REQUIRED,
            ),
            (QuotaError::NotReady, StatusCode::SERVICE_UNAVAILABLE),
            (QuotaError::GenerationInFlight, StatusCode::CONFLICT),
            (QuotaError::Abandoned, StatusCode::REQUEST_TIMEOUT),
            (
                QuotaError::UpstreamFailure("x".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (QuotaError::NoImageReturned(None), StatusCode::BAD_GATEWAY),
            (
                QuotaError::TierUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                QuotaError::Storage(KvError::Unavailable("x".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                QuotaError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            assert_eq!(error.status_code(), expected_status);
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[test]
    fn test_exhausted_messages() {
        assert_eq!(
            QuotaError::QuotaExhausted(QuotaClass::Anonymous).to_string(),
            "You have used all your trial generations."
        );
        assert_eq!(
            QuotaError::QuotaExhausted(QuotaClass::Free).to_string(),
            "You have used all your free generations for this month."
        );
        assert_eq!(
            QuotaError::ImageTooLarge { limit_mib: 4 }.to_string(),
            "File size must be under 4MB."
        );
    }

    #[test]
    fn test_upstream_text_becomes_action() {
        let app_err = QuotaError::NoImageReturned(Some("blocked for safety".into())).to_app_error();
        assert_eq!(app_err.action(), Some("blocked for safety"));
    }
}
