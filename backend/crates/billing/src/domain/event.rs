//! Billing Provider Events
//!
//! Webhook bodies are `{ "id", "type", "data": { "object" } }`. Only the
//! fields the subscription record needs are read.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::subscription::SubscriptionStatus;
use crate::error::{BillingError, BillingResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingEvent {
    /// `checkout.session.completed`
    CheckoutCompleted {
        session_id: String,
        customer_id: String,
        subscription_id: Option<String>,
    },
    /// `invoice.paid`
    InvoicePaid { customer_id: String },
    /// `invoice.payment_failed`
    PaymentFailed { customer_id: String },
    /// `customer.subscription.updated`
    SubscriptionUpdated {
        customer_id: String,
        status: SubscriptionStatus,
        price_id: Option<String>,
    },
    /// `customer.subscription.deleted`
    SubscriptionDeleted { customer_id: String },
    /// Anything else; acknowledged and ignored
    Unhandled { event_type: String },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: EnvelopeData,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    object: Value,
}

/// Parsed event plus the provider's event id (for logs)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedEvent {
    pub id: String,
    pub event: BillingEvent,
}

impl BillingEvent {
    pub fn event_type(&self) -> &str {
        match self {
            BillingEvent::CheckoutCompleted { .. } => "checkout.session.completed",
            BillingEvent::InvoicePaid { .. } => "invoice.paid",
            BillingEvent::PaymentFailed { .. } => "invoice.payment_failed",
            BillingEvent::SubscriptionUpdated { .. } => "customer.subscription.updated",
            BillingEvent::SubscriptionDeleted { .. } => "customer.subscription.deleted",
            BillingEvent::Unhandled { event_type } => event_type,
        }
    }

    /// Customer the event belongs to, if the event is handled
    pub fn customer_id(&self) -> Option<&str> {
        match self {
            BillingEvent::CheckoutCompleted { customer_id, .. }
            | BillingEvent::InvoicePaid { customer_id }
            | BillingEvent::PaymentFailed { customer_id }
            | BillingEvent::SubscriptionUpdated { customer_id, .. }
            | BillingEvent::SubscriptionDeleted { customer_id } => Some(customer_id),
            BillingEvent::Unhandled { .. } => None,
        }
    }
}

/// Parse a verified webhook body.
pub fn parse_event(payload: &[u8]) -> BillingResult<ReceivedEvent> {
    let envelope: Envelope = serde_json::from_slice(payload)
        .map_err(|e| BillingError::InvalidPayload(format!("malformed event: {}", e)))?;
    let object = &envelope.data.object;

    let event = match envelope.event_type.as_str() {
        "checkout.session.completed" => BillingEvent::CheckoutCompleted {
            session_id: string_field(object, "id").unwrap_or_default(),
            customer_id: customer_of(object)?,
            subscription_id: id_field(object, "subscription"),
        },
        "invoice.paid" => BillingEvent::InvoicePaid {
            customer_id: customer_of(object)?,
        },
        "invoice.payment_failed" => BillingEvent::PaymentFailed {
            customer_id: customer_of(object)?,
        },
        "customer.subscription.updated" => BillingEvent::SubscriptionUpdated {
            customer_id: customer_of(object)?,
            status: SubscriptionStatus::from_provider(
                object.get("status").and_then(Value::as_str).unwrap_or_default(),
            ),
            price_id: object
                .pointer("/items/data/0/price/id")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        "customer.subscription.deleted" => BillingEvent::SubscriptionDeleted {
            customer_id: customer_of(object)?,
        },
        other => BillingEvent::Unhandled {
            event_type: other.to_string(),
        },
    };

    Ok(ReceivedEvent {
        id: envelope.id,
        event,
    })
}

fn string_field(object: &Value, field: &str) -> Option<String> {
    object
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Reference fields arrive as an id string or, when expanded, an object.
fn id_field(object: &Value, field: &str) -> Option<String> {
    match object.get(field)? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Object(_) => object.get(field).and_then(|v| string_field(v, "id")),
        _ => None,
    }
}

fn customer_of(object: &Value) -> BillingResult<String> {
    id_field(object, "customer")
        .ok_or_else(|| BillingError::InvalidPayload("event has no customer".to_string()))
}
