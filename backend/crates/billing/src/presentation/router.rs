//! Billing Router

use axum::{
    Router,
    routing::{get, post},
};

use crate::domain::gateway::CheckoutGateway;
use crate::domain::repository::SubscriptionRepository;
use crate::presentation::handlers::{self, BillingAppState};

/// Create the billing router (`/plans`, `/create-checkout-session`, `/stripe-webhooks`)
pub fn billing_router<G, S>(state: BillingAppState<G, S>) -> Router
where
    G: CheckoutGateway + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/plans", get(handlers::list_plans::<G, S>))
        .route(
            "/create-checkout-session",
            post(handlers::create_checkout_session::<G, S>),
        )
        .route("/stripe-webhooks", post(handlers::stripe_webhooks::<G, S>))
        .with_state(state)
}
