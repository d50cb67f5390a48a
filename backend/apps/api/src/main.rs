//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod routes;
mod store;
mod tiers;

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use auth::{AuthConfig, GoogleTokenVerifier, IdentityState, resolve_identity};
use axum::{
    Router, http,
    http::{Method, header},
    middleware,
};
use billing::{
    BillingAppState, BillingConfig, KvSubscriptionRepository, StripeGateway, billing_router,
};
use platform::kv::MemoryKeyValueStore;
use platform::lock::KeyedLocks;
use quota::presentation::handlers::QuotaAppState;
use quota::{GeminiImageEditor, PgKeyValueStore, QuotaConfig, SystemClock, quota_router};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::routes::{ProfileState, app_router};
use crate::store::AppStore;
use crate::tiers::SubscriptionTiers;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "touchfeets=info,auth=info,quota=info,billing=info,tower_http=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Quota and profile storage
    let store = match env::var("DATABASE_URL") {
        Ok(database_url) if !database_url.is_empty() => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;
            tracing::info!("Migrations completed");

            AppStore::Postgres(PgKeyValueStore::new(pool))
        }
        _ => {
            tracing::warn!(
                "DATABASE_URL not set, quota state is kept in memory and lost on restart"
            );
            AppStore::Memory(MemoryKeyValueStore::new())
        }
    };
    tracing::info!(backend = store.backend(), "Key-value store ready");
    let store = Arc::new(store);

    let locks = KeyedLocks::new();

    // Identity
    let auth_config = Arc::new(AuthConfig::with_client_id(env_or("GOOGLE_CLIENT_ID", "")));
    if auth_config.client_id.is_empty() {
        tracing::warn!("GOOGLE_CLIENT_ID not set, every bearer token will be rejected");
    }
    let identity_state = IdentityState {
        verifier: Arc::new(GoogleTokenVerifier::new(auth_config.clone())?),
        config: auth_config,
    };

    // Billing
    let billing_config = Arc::new(BillingConfig {
        secret_key: env_or("STRIPE_SECRET_KEY", ""),
        webhook_secret: env_or("STRIPE_WEBHOOK_SECRET", ""),
        frontend_url: env_or("FRONTEND_URL", &BillingConfig::default().frontend_url),
        ..BillingConfig::default()
    });
    if billing_config.secret_key.is_empty() {
        tracing::warn!("STRIPE_SECRET_KEY not set, checkout is disabled");
    }
    let subscriptions = Arc::new(KvSubscriptionRepository::new(Arc::new(
        MemoryKeyValueStore::new(),
    )));
    let billing_state = BillingAppState {
        gateway: Arc::new(StripeGateway::new(&billing_config)?),
        repo: subscriptions.clone(),
        config: billing_config,
        locks: locks.clone(),
    };

    // Quota and generation
    let base_quota_config = if cfg!(debug_assertions) {
        QuotaConfig::development()
    } else {
        QuotaConfig::default()
    };
    let quota_config = QuotaConfig {
        model: env_or("GEMINI_MODEL", &base_quota_config.model),
        ..base_quota_config
    };
    let gemini_api_key = env_or("GEMINI_API_KEY", "");
    if gemini_api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY not set, generation requests will fail upstream");
    }
    let quota_state = QuotaAppState {
        store: store.clone(),
        clock: Arc::new(SystemClock),
        editor: Arc::new(GeminiImageEditor::new(gemini_api_key, &quota_config)?),
        tiers: Arc::new(SubscriptionTiers::new(subscriptions.clone())),
        config: Arc::new(quota_config),
        locks,
    };

    // CORS configuration
    let frontend_origins = env_or(
        "FRONTEND_ORIGINS",
        "http://localhost:5173,http://127.0.0.1:5173",
    );

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let api = Router::new()
        .merge(app_router(ProfileState {
            store,
            subscriptions,
        }))
        .merge(quota_router(quota_state))
        .merge(billing_router(billing_state));

    let app = Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(
            identity_state,
            resolve_identity::<GoogleTokenVerifier>,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port: u16 = env_or("PORT", "4242").parse()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
