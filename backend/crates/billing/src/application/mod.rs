//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod create_checkout;
pub mod handle_webhook;
pub mod resolve_tier;

// Re-exports
pub use config::BillingConfig;
pub use create_checkout::CreateCheckoutUseCase;
pub use handle_webhook::HandleWebhookUseCase;
