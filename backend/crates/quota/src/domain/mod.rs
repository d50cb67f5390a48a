//! Domain Layer - Entitlement rules
//!
//! This layer contains:
//! - Identity classes (anonymous, free, paid)
//! - Value objects (Remaining, PeriodKey, QuotaSnapshot)
//! - Clock port and implementations
//! - Image edit port
//! - Repository and tier source traits
//! - Pure permission and decrement rules

pub mod clock;
pub mod identity;
pub mod image;
pub mod repository;
pub mod services;
pub mod value_objects;
