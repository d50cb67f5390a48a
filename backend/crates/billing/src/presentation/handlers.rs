//! HTTP Handlers

use std::sync::Arc;

use auth::CurrentIdentity;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use platform::lock::KeyedLocks;

use crate::application::config::BillingConfig;
use crate::application::create_checkout::CreateCheckoutUseCase;
use crate::application::handle_webhook::HandleWebhookUseCase;
use crate::domain::gateway::CheckoutGateway;
use crate::domain::repository::SubscriptionRepository;
use crate::error::BillingResult;
use crate::presentation::dto::{CheckoutRequest, CheckoutResponse, PlansResponse, WebhookAck};

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Shared state for billing handlers
pub struct BillingAppState<G, S>
where
    G: CheckoutGateway,
    S: SubscriptionRepository,
{
    pub gateway: Arc<G>,
    pub repo: Arc<S>,
    pub config: Arc<BillingConfig>,
    pub locks: KeyedLocks,
}

impl<G, S> Clone for BillingAppState<G, S>
where
    G: CheckoutGateway,
    S: SubscriptionRepository,
{
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            repo: self.repo.clone(),
            config: self.config.clone(),
            locks: self.locks.clone(),
        }
    }
}

/// GET /api/plans
pub async fn list_plans<G, S>(State(state): State<BillingAppState<G, S>>) -> Json<PlansResponse>
where
    G: CheckoutGateway + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Json(PlansResponse {
        plans: state.config.plans.clone(),
    })
}

/// POST /api/create-checkout-session
pub async fn create_checkout_session<G, S>(
    State(state): State<BillingAppState<G, S>>,
    identity: CurrentIdentity,
    Json(req): Json<CheckoutRequest>,
) -> BillingResult<Json<CheckoutResponse>>
where
    G: CheckoutGateway + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let verified = identity.require()?;

    let use_case = CreateCheckoutUseCase::new(
        state.gateway.clone(),
        state.repo.clone(),
        state.config.clone(),
    );
    let session = use_case.execute(verified, &req.price_id).await?;

    Ok(Json(CheckoutResponse {
        session_id: session.id,
        url: session.url,
    }))
}

/// POST /api/stripe-webhooks
///
/// Takes the raw body; the signature covers the exact bytes sent.
pub async fn stripe_webhooks<G, S>(
    State(state): State<BillingAppState<G, S>>,
    headers: HeaderMap,
    body: Bytes,
) -> BillingResult<Json<WebhookAck>>
where
    G: CheckoutGateway + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let use_case =
        HandleWebhookUseCase::new(state.repo.clone(), state.config.clone(), state.locks.clone());
    use_case.execute(&body, signature).await?;

    Ok(Json(WebhookAck { received: true }))
}
