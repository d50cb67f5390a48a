//! Application Configuration
//!
//! Configuration for the Quota application layer.

use std::time::Duration;

/// Re-export cookie settings from platform
pub use platform::cookie::{CookieConfig, SameSite};

use crate::domain::identity::QuotaClass;

/// Instruction sent with every uploaded image
pub const DEFAULT_EDIT_PROMPT: &str = "Modify the uploaded image to add Jesus Christ, in a reverent and artistic Byzantine style, gently touching the subject's bare feet. Maintain original background, perspective, and lighting. Ensure hands align anatomically with the feet, cast appropriate shadows, and preserve skin texture. Keep attire traditional with soft halo highlights. Do not change the subject's identity or facial features. Avoid distortions, extra limbs, or blur. Final output at original resolution.";

/// Quota application configuration
#[derive(Debug, Clone)]
pub struct QuotaConfig {
    /// Generations per month for devices that have not signed in
    pub anonymous_allotment: u32,
    /// Generations per month for signed-in users without a subscription
    pub free_allotment: u32,
    /// Upload limit after base64 decoding
    pub max_upload_bytes: usize,
    pub allowed_mime_types: Vec<String>,
    /// Cookie carrying the anonymous device id
    pub device_cookie: CookieConfig,
    pub edit_prompt: String,
    pub model: String,
    pub gemini_base_url: String,
    /// Timeout for one image edit call
    pub request_timeout: Duration,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            anonymous_allotment: 3,
            free_allotment: 5,
            max_upload_bytes: 4 * 1024 * 1024,
            allowed_mime_types: vec![
                "image/png".to_string(),
                "image/jpeg".to_string(),
                "image/webp".to_string(),
            ],
            device_cookie: CookieConfig {
                name: "tf_device".to_string(),
                max_age_secs: Some(60 * 60 * 24 * 365),
                ..CookieConfig::default()
            },
            edit_prompt: DEFAULT_EDIT_PROMPT.to_string(),
            model: "gemini-2.5-flash-image-preview".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl QuotaConfig {
    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        let mut config = Self::default();
        config.device_cookie.secure = false;
        config
    }

    pub fn allotment(&self, class: QuotaClass) -> u32 {
        match class {
            QuotaClass::Anonymous => self.anonymous_allotment,
            QuotaClass::Free => self.free_allotment,
        }
    }
}
