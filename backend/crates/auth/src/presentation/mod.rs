//! Presentation Layer
//!
//! Identity middleware and request extractor.

pub mod middleware;

pub use middleware::{CurrentIdentity, IdentityState, resolve_identity};
