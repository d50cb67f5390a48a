//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// OAuth client id; ID tokens must carry it as audience
    pub client_id: String,
    /// Accepted `iss` values
    pub allowed_issuers: Vec<String>,
    /// Provider endpoint that resolves an ID token to its claims
    pub tokeninfo_url: String,
    /// Timeout for the provider call
    pub request_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            allowed_issuers: vec![
                "accounts.google.com".to_string(),
                "https://accounts.google.com".to_string(),
            ],
            tokeninfo_url: "https://oauth2.googleapis.com/tokeninfo".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl AuthConfig {
    /// Default provider settings for the given OAuth client id
    pub fn with_client_id(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Default::default()
        }
    }
}
