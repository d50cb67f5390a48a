//! Infrastructure Layer
//!
//! Implementations of the domain ports.

pub mod kv;
pub mod stripe;

pub use kv::KvSubscriptionRepository;
pub use stripe::StripeGateway;
