//! Application Configuration
//!
//! Configuration for the Billing application layer.

use std::time::Duration;

use crate::domain::plan::{Plan, default_catalog};

/// Billing application configuration
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Provider secret API key; empty disables checkout
    pub secret_key: String,
    /// Webhook signing secret; empty disables webhooks
    pub webhook_secret: String,
    /// Page the provider returns the customer to
    pub frontend_url: String,
    pub api_base: String,
    /// Maximum age of a webhook signature
    pub signature_tolerance: Duration,
    pub plans: Vec<Plan>,
    pub request_timeout: Duration,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            webhook_secret: String::new(),
            frontend_url: "http://localhost:5173".to_string(),
            api_base: "https://api.stripe.com/v1".to_string(),
            signature_tolerance: Duration::from_secs(300),
            plans: default_catalog(),
            request_timeout: Duration::from_secs(20),
        }
    }
}

impl BillingConfig {
    pub fn find_plan(&self, price_id: &str) -> Option<&Plan> {
        self.plans.iter().find(|plan| plan.price_id == price_id)
    }

    pub fn success_url(&self) -> String {
        format!(
            "{}?checkout=success&session_id={{CHECKOUT_SESSION_ID}}",
            self.frontend_url.trim_end_matches('/')
        )
    }

    pub fn cancel_url(&self) -> String {
        format!("{}?checkout=cancel", self.frontend_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_urls() {
        let config = BillingConfig {
            frontend_url: "https://touchfeets.example/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.success_url(),
            "https://touchfeets.example?checkout=success&session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(config.cancel_url(), "https://touchfeets.example?checkout=cancel");
    }

    #[test]
    fn test_find_plan() {
        let config = BillingConfig::default();
        assert_eq!(
            config.find_plan("price_1S9bsoF1aEX7i16QAEGszhjT").map(|p| p.name.as_str()),
            Some("Saint")
        );
        assert!(config.find_plan("price_unknown").is_none());
    }
}
