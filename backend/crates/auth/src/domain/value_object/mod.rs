//! Value Object Module

pub mod user_id;
