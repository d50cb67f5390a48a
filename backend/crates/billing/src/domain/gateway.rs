//! Billing Provider Port
//!
//! Implementation is in infrastructure layer.

use crate::error::BillingResult;

/// Parameters of a hosted subscription checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub customer_id: String,
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// Hosted checkout page created by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[trait_variant::make(CheckoutGateway: Send)]
pub trait LocalCheckoutGateway {
    async fn find_customer_by_email(&self, email: &str) -> BillingResult<Option<String>>;

    async fn create_customer(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> BillingResult<String>;

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> BillingResult<CheckoutSession>;
}
