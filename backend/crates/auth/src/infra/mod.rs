//! Infrastructure Layer
//!
//! External identity provider integration.

pub mod google;

pub use google::GoogleTokenVerifier;
