//! Domain Services
//!
//! Webhook signature verification and subscription state transitions.

use chrono::{DateTime, Utc};
use kernel::tier::UserTier;
use platform::crypto::{constant_time_eq, hmac_sha256_hex};

use crate::domain::event::BillingEvent;
use crate::domain::subscription::{Subscription, SubscriptionStatus};
use crate::error::{BillingError, BillingResult};

/// Verify a `t=<unix>,v1=<hex>` signature header.
///
/// The signed content is `"{t}.{payload}"`. Any one matching `v1` entry is
/// enough. Timestamps older than `tolerance_secs` are rejected.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: DateTime<Utc>,
    tolerance_secs: i64,
) -> BillingResult<()> {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for item in header.split(',') {
        match item.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| BillingError::WebhookRejected("Unable to extract timestamp".to_string()))?;
    let issued_at: i64 = timestamp
        .parse()
        .map_err(|_| BillingError::WebhookRejected("Invalid timestamp".to_string()))?;
    if signatures.is_empty() {
        return Err(BillingError::WebhookRejected(
            "No signatures found with expected scheme".to_string(),
        ));
    }

    let mut signed = Vec::with_capacity(timestamp.len() + 1 + payload.len());
    signed.extend_from_slice(timestamp.as_bytes());
    signed.push(b'.');
    signed.extend_from_slice(payload);
    let expected = hmac_sha256_hex(secret.as_bytes(), &signed);

    if !signatures
        .iter()
        .any(|candidate| constant_time_eq(candidate.as_bytes(), expected.as_bytes()))
    {
        return Err(BillingError::WebhookRejected(
            "No signatures found matching the expected signature for payload".to_string(),
        ));
    }

    if issued_at < now.timestamp() - tolerance_secs {
        return Err(BillingError::WebhookRejected(
            "Timestamp outside the tolerance zone".to_string(),
        ));
    }

    Ok(())
}

/// Apply a handled event to the customer's record.
///
/// Returns `false` when the event does not change anything the backend keeps.
pub fn apply_event(
    subscription: &mut Subscription,
    event: &BillingEvent,
    now: DateTime<Utc>,
) -> bool {
    match event {
        BillingEvent::CheckoutCompleted {
            subscription_id, ..
        } => {
            if subscription_id.is_some() {
                subscription.subscription_id = subscription_id.clone();
            }
            subscription.status = SubscriptionStatus::Active;
            subscription.tier = UserTier::Paid;
        }
        BillingEvent::InvoicePaid { .. } => {
            subscription.status = SubscriptionStatus::Active;
        }
        BillingEvent::PaymentFailed { .. } => {
            // access continues until the provider updates or cancels the subscription
            subscription.status = SubscriptionStatus::PastDue;
        }
        BillingEvent::SubscriptionUpdated {
            status, price_id, ..
        } => {
            subscription.status = *status;
            if price_id.is_some() {
                subscription.price_id = price_id.clone();
            }
            subscription.tier = if status.grants_access() {
                UserTier::Paid
            } else {
                UserTier::Free
            };
        }
        BillingEvent::SubscriptionDeleted { .. } => {
            subscription.status = SubscriptionStatus::Canceled;
            subscription.tier = UserTier::Free;
        }
        BillingEvent::Unhandled { .. } => return false,
    }

    subscription.updated_at = now;
    true
}
