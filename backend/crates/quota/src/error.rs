//! Quota Error Types
//!
//! Quota-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::kv::KvError;
use thiserror::Error;

use crate::domain::identity::QuotaClass;

/// Quota-specific result type alias
pub type QuotaResult<T> = Result<T, QuotaError>;

/// Quota-specific error variants
#[derive(Debug, Error)]
pub enum QuotaError {
    /// Nothing was uploaded
    #[error("Please upload an image first.")]
    EmptyUpload,

    /// Upload is not one of the accepted image types
    #[error("Unsupported image type: {0}")]
    UnsupportedMediaType(String),

    /// Upload is not valid base64
    #[error("Image data is not valid base64")]
    InvalidImage,

    /// Decoded upload exceeds the size limit
    #[error("File size must be under {limit_mib}MB.")]
    ImageTooLarge { limit_mib: usize },

    /// No generations left for this period
    #[error("{}", exhausted_message(*.0))]
    QuotaExhausted(QuotaClass),

    /// Permission asked before the quota was loaded
    #[error("Quota is still loading")]
    NotReady,

    /// Another generation for the same caller has not resolved yet
    #[error("A generation is already in progress")]
    GenerationInFlight,

    /// Caller stopped waiting for the result
    #[error("Generation abandoned by caller")]
    Abandoned,

    /// Image service could not be reached or answered with an error
    #[error("Failed to generate image: {0}")]
    UpstreamFailure(String),

    /// Image service answered without an image
    #[error("API did not return an image. It might have been blocked.")]
    NoImageReturned(Option<String>),

    /// Subscription tier could not be resolved
    #[error("Tier lookup failed: {0}")]
    TierUnavailable(String),

    /// Quota storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

fn exhausted_message(class: QuotaClass) -> &'static str {
    match class {
        QuotaClass::Anonymous => "You have used all your trial generations.",
        QuotaClass::Free => "You have used all your free generations for this month.",
    }
}

impl QuotaError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuotaError::EmptyUpload
            | QuotaError::UnsupportedMediaType(_)
            | QuotaError::InvalidImage
            | QuotaError::ImageTooLarge { .. } => ErrorKind::BadRequest,
            QuotaError::QuotaExhausted(QuotaClass::Anonymous) => ErrorKind::TooManyRequests,
            QuotaError::QuotaExhausted(QuotaClass::Free) => ErrorKind::PaymentRequired,
            QuotaError::GenerationInFlight => ErrorKind::Conflict,
            QuotaError::Abandoned => ErrorKind::RequestTimeout,
            QuotaError::UpstreamFailure(_) | QuotaError::NoImageReturned(_) => {
                ErrorKind::BadGateway
            }
            QuotaError::NotReady | QuotaError::TierUnavailable(_) | QuotaError::Storage(_) => {
                ErrorKind::ServiceUnavailable
            }
            QuotaError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            QuotaError::QuotaExhausted(QuotaClass::Anonymous) => {
                err.with_action("Please sign in for more.")
            }
            QuotaError::QuotaExhausted(QuotaClass::Free) => {
                err.with_action("Please subscribe for more.")
            }
            QuotaError::NoImageReturned(Some(text)) => err.with_action(text.clone()),
            QuotaError::NotReady | QuotaError::GenerationInFlight => {
                err.with_action("Please wait a moment and try again.")
            }
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            QuotaError::Storage(e) => {
                tracing::error!(error = %e, "Quota storage error");
            }
            QuotaError::TierUnavailable(msg) => {
                tracing::error!(message = %msg, "Tier lookup failed");
            }
            QuotaError::Internal(msg) => {
                tracing::error!(message = %msg, "Quota internal error");
            }
            QuotaError::UpstreamFailure(reason) => {
                tracing::warn!(reason = %reason, "Image service failure");
            }
            QuotaError::NoImageReturned(text) => {
                tracing::warn!(text = ?text, "Image service returned no image");
            }
            QuotaError::GenerationInFlight => {
                tracing::warn!("Concurrent generation rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Quota error");
            }
        }
    }
}

impl From<QuotaError> for AppError {
    fn from(err: QuotaError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for QuotaError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
