//! Handle Webhook Use Case
//!
//! Verify the signature, parse the event and update the customer's record.
//! Updates for one customer are serialized.

use std::sync::Arc;

use chrono::Utc;
use platform::lock::KeyedLocks;

use crate::application::config::BillingConfig;
use crate::domain::event::{BillingEvent, parse_event};
use crate::domain::repository::SubscriptionRepository;
use crate::domain::services::{apply_event, verify_signature};
use crate::domain::subscription::Subscription;
use crate::error::{BillingError, BillingResult};

pub struct HandleWebhookUseCase<S>
where
    S: SubscriptionRepository,
{
    repo: Arc<S>,
    config: Arc<BillingConfig>,
    locks: KeyedLocks,
}

impl<S> HandleWebhookUseCase<S>
where
    S: SubscriptionRepository + Sync,
{
    pub fn new(repo: Arc<S>, config: Arc<BillingConfig>, locks: KeyedLocks) -> Self {
        Self {
            repo,
            config,
            locks,
        }
    }

    /// Returns the handled event.
    pub async fn execute(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> BillingResult<BillingEvent> {
        if self.config.webhook_secret.is_empty() {
            return Err(BillingError::NotConfigured("STRIPE_WEBHOOK_SECRET"));
        }

        let signature = signature.ok_or_else(|| {
            BillingError::WebhookRejected("No stripe-signature header value was provided.".to_string())
        })?;

        verify_signature(
            payload,
            signature,
            &self.config.webhook_secret,
            Utc::now(),
            self.config.signature_tolerance.as_secs() as i64,
        )?;

        let received = parse_event(payload)?;
        let event = received.event;

        let Some(customer_id) = event.customer_id() else {
            tracing::info!(event_id = %received.id, event_type = %event.event_type(), "Unhandled event type");
            return Ok(event);
        };

        let _guard = self.locks.lock(&format!("customer:{}", customer_id)).await;

        let mut record = match self.repo.find_by_customer(customer_id).await? {
            Some(existing) => existing,
            None => {
                tracing::warn!(customer_id = %customer_id, "Event for a customer not linked to any user");
                Subscription::new(customer_id)
            }
        };

        if apply_event(&mut record, &event, Utc::now()) {
            self.repo.save(&record).await?;
        }

        tracing::info!(
            event_id = %received.id,
            event_type = %event.event_type(),
            customer_id = %customer_id,
            user_id = ?record.user_id,
            tier = %record.tier,
            status = ?record.status,
            "Billing event applied"
        );

        Ok(event)
    }
}
