//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations, free of any Touch Feets domain rules:
//! - Key-value storage port with an in-memory implementation
//! - Per-key async locks for serializing read-modify-write sequences
//! - Cryptographic helpers (HMAC-SHA256, Base64, constant-time compare)
//! - Cookie and bearer-token header handling

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod kv;
pub mod lock;
