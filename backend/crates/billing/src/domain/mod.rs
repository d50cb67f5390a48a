//! Domain Layer - Billing rules
//!
//! This layer contains:
//! - Plan catalog
//! - Subscription record and status
//! - Provider events
//! - Webhook signature verification and event application
//! - Repository and gateway traits

pub mod event;
pub mod gateway;
pub mod plan;
pub mod repository;
pub mod services;
pub mod subscription;
