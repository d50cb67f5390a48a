//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Remaining;

/// Response for GET /api/quota
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaResponse {
    /// `null` when unlimited
    pub remaining: Option<u32>,
    pub unlimited: bool,
    pub ready: bool,
    /// `anonymous`, `free` or `paid`
    pub tier: &'static str,
}

impl QuotaResponse {
    pub fn new(remaining: Remaining, ready: bool, tier: &'static str) -> Self {
        Self {
            remaining: remaining.count(),
            unlimited: matches!(remaining, Remaining::Unbounded),
            ready,
            tier,
        }
    }
}

/// Request for POST /api/generate
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub image_b64: String,
    #[serde(default)]
    pub mime_type: String,
}

/// Response for POST /api/generate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub image_b64: String,
    pub text: Option<String>,
    pub remaining: Option<u32>,
    pub unlimited: bool,
    pub watermark: bool,
}
