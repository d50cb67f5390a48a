//! Billing Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Plans, subscriptions, provider events, signature rules
//! - `application/` - Checkout, webhook handling, tier resolution
//! - `infra/` - Stripe gateway, key-value subscription directory
//! - `presentation/` - HTTP handlers
//!
//! ## Trust Model
//! - Webhook events are accepted only with a valid, fresh signature
//! - Webhooks are the only writer of a user's tier; checkout never grants access
//! - Checkout requires a verified identity with an email address

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::BillingConfig;
pub use application::resolve_tier::resolve_tier;
pub use domain::plan::Plan;
pub use domain::subscription::{Subscription, SubscriptionStatus};
pub use error::{BillingError, BillingResult};
pub use infra::kv::KvSubscriptionRepository;
pub use infra::stripe::StripeGateway;
pub use presentation::handlers::BillingAppState;
pub use presentation::router::billing_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
