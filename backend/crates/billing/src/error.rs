//! Billing Error Types
//!
//! Billing-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::kv::KvError;
use thiserror::Error;

/// Billing-specific result type alias
pub type BillingResult<T> = Result<T, BillingError>;

/// Billing-specific error variants
#[derive(Debug, Error)]
pub enum BillingError {
    /// Price id not in the plan catalog
    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    /// Verified identity carries no email to attach to the customer
    #[error("An email address is required to subscribe")]
    MissingEmail,

    /// Webhook signature header missing, malformed, stale or wrong
    #[error("Webhook Error: {0}")]
    WebhookRejected(String),

    /// Signed webhook body is not a usable event
    #[error("Webhook Error: {0}")]
    InvalidPayload(String),

    /// Caller is not signed in
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Billing provider failed or rejected the call
    #[error("Could not create checkout session")]
    Provider(String),

    /// Subscription storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    /// Required secret is not configured
    #[error("Billing is not configured: {0}")]
    NotConfigured(&'static str),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BillingError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            BillingError::Auth(e) => e.status_code(),
            other => StatusCode::from_u16(other.kind().status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BillingError::UnknownPlan(_)
            | BillingError::MissingEmail
            | BillingError::WebhookRejected(_)
            | BillingError::InvalidPayload(_) => ErrorKind::BadRequest,
            BillingError::Auth(e) => e.kind(),
            BillingError::Provider(_) => ErrorKind::BadGateway,
            BillingError::NotConfigured(_) | BillingError::Storage(_) => {
                ErrorKind::ServiceUnavailable
            }
            BillingError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            BillingError::Auth(e) => e.to_app_error(),
            BillingError::UnknownPlan(_) => AppError::new(self.kind(), self.to_string())
                .with_action("Please pick one of the listed plans."),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            BillingError::Provider(detail) => {
                tracing::error!(detail = %detail, "Billing provider error");
            }
            BillingError::NotConfigured(what) => {
                tracing::error!(missing = %what, "Billing not configured");
            }
            BillingError::Storage(e) => {
                tracing::error!(error = %e, "Subscription storage error");
            }
            BillingError::Internal(msg) => {
                tracing::error!(message = %msg, "Billing internal error");
            }
            BillingError::WebhookRejected(reason) => {
                tracing::warn!(reason = %reason, "Webhook rejected");
            }
            BillingError::InvalidPayload(reason) => {
                tracing::warn!(reason = %reason, "Webhook payload unusable");
            }
            _ => {
                tracing::debug!(error = %self, "Billing error");
            }
        }
    }
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for BillingError {
    fn into_response(self) -> Response {
        match self {
            BillingError::Auth(e) => e.into_response(),
            other => {
                other.log();
                other.to_app_error().into_response()
            }
        }
    }
}
