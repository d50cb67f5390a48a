//! Domain Layer
//!
//! Contains entities, value objects, the verifier trait, and claim rules.

pub mod entity;
pub mod services;
pub mod value_object;
pub mod verifier;

// Re-exports
pub use entity::{identity::VerifiedIdentity, user_profile::UserProfile};
pub use verifier::{IdTokenVerifier, TokenClaims};
