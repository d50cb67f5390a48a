//! Subscription Entity

use chrono::{DateTime, Utc};
use kernel::tier::UserTier;
use serde::{Deserialize, Serialize};

/// Provider-side subscription status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Customer exists, no subscription yet
    #[default]
    Incomplete,
    Active,
    Trialing,
    PastDue,
    Unpaid,
    Canceled,
}

impl SubscriptionStatus {
    /// Unknown statuses grant nothing.
    pub fn from_provider(status: &str) -> Self {
        match status {
            "active" => SubscriptionStatus::Active,
            "trialing" => SubscriptionStatus::Trialing,
            "past_due" => SubscriptionStatus::PastDue,
            "unpaid" => SubscriptionStatus::Unpaid,
            "canceled" => SubscriptionStatus::Canceled,
            _ => SubscriptionStatus::Incomplete,
        }
    }

    pub fn grants_access(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }
}

/// What the backend knows about one billing customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub customer_id: String,
    /// Identity-provider subject, set at checkout
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub subscription_id: Option<String>,
    pub price_id: Option<String>,
    pub status: SubscriptionStatus,
    pub tier: UserTier,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            user_id: None,
            email: None,
            subscription_id: None,
            price_id: None,
            status: SubscriptionStatus::default(),
            tier: UserTier::Free,
            updated_at: Utc::now(),
        }
    }

    pub fn linked_to(mut self, user_id: impl Into<String>, email: Option<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.email = email;
        self
    }
}
