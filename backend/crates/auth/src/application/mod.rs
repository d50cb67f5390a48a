//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod profile_cache;
pub mod verify_token;

// Re-exports
pub use config::AuthConfig;
pub use profile_cache::ProfileCache;
pub use verify_token::VerifyTokenUseCase;
