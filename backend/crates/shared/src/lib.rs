//! Shared Kernel - Domain-crossing minimal core
//!
//! Vocabulary that every Touch Feets crate agrees on:
//! - Unified error type ([`error::app_error::AppError`]) and its HTTP mapping
//! - Typed identifiers
//! - The subscription tier of a registered user
//!
//! Only things whose meaning is identical in every domain belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod tier;
