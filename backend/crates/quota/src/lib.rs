//! Quota (Entitlement) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Identity classes, remaining counts, periods, ports
//! - `application/` - Entitlement tracker, quota session, generation use case
//! - `infra/` - Key-value quota records, Postgres store, Gemini image editor
//! - `presentation/` - HTTP handlers
//!
//! ## Entitlement Model
//! - Anonymous devices and free users get a monthly allotment; paid users are unbounded
//! - Periods follow the UTC calendar month; a stale period resets before any read
//! - Quota is spent only after the image service returned an image to a caller
//!   that is still waiting for it
//! - Tier is looked up server-side on every request, never taken from the client

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::QuotaConfig;
pub use application::tracker::EntitlementTracker;
pub use domain::clock::{Clock, FixedClock, SystemClock};
pub use domain::identity::{Identity, QuotaClass};
pub use domain::repository::TierSource;
pub use domain::value_objects::{PeriodKey, QuotaSnapshot, Remaining};
pub use error::{QuotaError, QuotaResult};
pub use infra::gemini::GeminiImageEditor;
pub use infra::postgres::PgKeyValueStore;
pub use presentation::router::quota_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[cfg(test)]
mod tests;
