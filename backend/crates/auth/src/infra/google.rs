//! Google tokeninfo client
//!
//! Resolves a Google ID token to its claims through the tokeninfo endpoint.
//! Google answers 400 for tokens that are malformed, expired or forged.

use std::sync::Arc;

use reqwest::StatusCode;

use crate::application::config::AuthConfig;
use crate::domain::verifier::{IdTokenVerifier, TokenClaims};
use crate::error::{AuthError, AuthResult};

#[derive(Clone)]
pub struct GoogleTokenVerifier {
    client: reqwest::Client,
    config: Arc<AuthConfig>,
}

impl GoogleTokenVerifier {
    pub fn new(config: Arc<AuthConfig>) -> AuthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AuthError::Internal(format!("HTTP client build failed: {}", e)))?;
        Ok(Self { client, config })
    }
}

impl IdTokenVerifier for GoogleTokenVerifier {
    async fn fetch_claims(&self, token: &str) -> AuthResult<TokenClaims> {
        let response = self
            .client
            .get(&self.config.tokeninfo_url)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                return Err(AuthError::InvalidToken(
                    "rejected by identity provider".to_string(),
                ));
            }
            status => {
                return Err(AuthError::ProviderUnavailable(format!(
                    "tokeninfo answered {}",
                    status
                )));
            }
        }

        response
            .json::<TokenClaims>()
            .await
            .map_err(|e| AuthError::InvalidToken(format!("unreadable claims: {}", e)))
    }
}
