//! Infrastructure Layer
//!
//! Storage and image service adapters.

pub mod gemini;
pub mod kv;
pub mod postgres;
