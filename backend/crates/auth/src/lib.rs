//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Verified identity, cached profile, verifier trait, claim rules
//! - `application/` - Token verification and profile cache use cases
//! - `infra/` - Google tokeninfo client
//! - `presentation/` - Identity middleware and extractor
//!
//! ## Security Model
//! - Sign-in happens in the browser with the identity provider; the backend
//!   only ever sees the resulting ID token as `Authorization: Bearer <token>`
//! - Tokens are checked for audience, issuer and expiry on every request
//! - The profile cached for the UI carries a tier hint only; entitlement
//!   decisions read the tier from the billing side, never from the cache

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::entity::identity::VerifiedIdentity;
pub use domain::entity::user_profile::UserProfile;
pub use domain::value_object::user_id::UserId;
pub use error::{AuthError, AuthResult};
pub use infra::google::GoogleTokenVerifier;
pub use presentation::middleware::{CurrentIdentity, IdentityState, resolve_identity};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
