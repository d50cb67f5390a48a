//! Create Checkout Use Case
//!
//! Finds or creates the provider customer for a signed-in user, links it to
//! the user and opens a hosted subscription checkout. Access is granted later
//! by the webhook, never here.

use std::sync::Arc;

use auth::VerifiedIdentity;
use chrono::Utc;

use crate::application::config::BillingConfig;
use crate::domain::gateway::{CheckoutGateway, CheckoutRequest, CheckoutSession};
use crate::domain::repository::SubscriptionRepository;
use crate::domain::subscription::Subscription;
use crate::error::{BillingError, BillingResult};

pub struct CreateCheckoutUseCase<G, S>
where
    G: CheckoutGateway,
    S: SubscriptionRepository,
{
    gateway: Arc<G>,
    repo: Arc<S>,
    config: Arc<BillingConfig>,
}

impl<G, S> CreateCheckoutUseCase<G, S>
where
    G: CheckoutGateway + Sync,
    S: SubscriptionRepository + Sync,
{
    pub fn new(gateway: Arc<G>, repo: Arc<S>, config: Arc<BillingConfig>) -> Self {
        Self {
            gateway,
            repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        identity: &VerifiedIdentity,
        price_id: &str,
    ) -> BillingResult<CheckoutSession> {
        if self.config.secret_key.is_empty() {
            return Err(BillingError::NotConfigured("STRIPE_SECRET_KEY"));
        }

        let plan = self
            .config
            .find_plan(price_id)
            .ok_or_else(|| BillingError::UnknownPlan(price_id.to_string()))?;

        let email = identity
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or(BillingError::MissingEmail)?;

        let customer_id = match self.gateway.find_customer_by_email(email).await? {
            Some(id) => id,
            None => {
                let id = self
                    .gateway
                    .create_customer(email, identity.name.as_deref())
                    .await?;
                tracing::info!(customer_id = %id, user_id = %identity.user_id, "Billing customer created");
                id
            }
        };

        let user_id = identity.user_id.as_str();
        let mut record = match self.repo.find_by_customer(&customer_id).await? {
            Some(existing) => existing,
            None => Subscription::new(&customer_id),
        };
        record.user_id = Some(user_id.to_string());
        record.email = Some(email.to_string());
        record.updated_at = Utc::now();
        self.repo.save(&record).await?;

        let session = self
            .gateway
            .create_checkout_session(&CheckoutRequest {
                customer_id,
                price_id: plan.price_id.clone(),
                success_url: self.config.success_url(),
                cancel_url: self.config.cancel_url(),
            })
            .await?;

        tracing::info!(
            user_id = %user_id,
            plan = %plan.name,
            session_id = %session.id,
            "Checkout session created"
        );

        Ok(session)
    }
}
