//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::client::BearerError;
use platform::kv::KvError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No Authorization header on a route that needs one
    #[error("Authorization header missing")]
    MissingAuthorization,

    /// Authorization header without a bearer token
    #[error("Token missing")]
    TokenMissing,

    /// Token was valid once but has expired; the client should sign in again
    #[error("Token expired")]
    TokenExpired,

    /// Identity provider rejected the token, or its claims failed validation
    #[error("Invalid token")]
    InvalidToken(String),

    /// Identity provider could not be reached
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Profile cache storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthorization
            | AuthError::TokenMissing
            | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken(_) => StatusCode::FORBIDDEN,
            AuthError::ProviderUnavailable(_) | AuthError::Storage(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingAuthorization
            | AuthError::TokenMissing
            | AuthError::TokenExpired => ErrorKind::Unauthorized,
            AuthError::InvalidToken(_) => ErrorKind::Forbidden,
            AuthError::ProviderUnavailable(_) | AuthError::Storage(_) => {
                ErrorKind::ServiceUnavailable
            }
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            AuthError::MissingAuthorization | AuthError::TokenMissing => {
                err.with_action("Please sign in and try again.")
            }
            AuthError::TokenExpired => err.with_action("Please sign in again."),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::InvalidToken(reason) => {
                tracing::warn!(reason = %reason, "Rejected identity token");
            }
            AuthError::ProviderUnavailable(msg) => {
                tracing::error!(message = %msg, "Identity provider unavailable");
            }
            AuthError::Storage(e) => {
                tracing::error!(error = %e, "Profile cache storage error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<BearerError> for AuthError {
    fn from(err: BearerError) -> Self {
        match err {
            BearerError::MissingHeader => AuthError::MissingAuthorization,
            BearerError::MissingToken => AuthError::TokenMissing,
        }
    }
}
