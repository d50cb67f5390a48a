//! Verify Token Use Case

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::domain::entity::identity::VerifiedIdentity;
use crate::domain::services::{claims_say_expired, validate_claims};
use crate::domain::verifier::IdTokenVerifier;
use crate::error::{AuthError, AuthResult};

/// Verify an ID token and turn it into a [`VerifiedIdentity`].
pub struct VerifyTokenUseCase<V>
where
    V: IdTokenVerifier,
{
    verifier: Arc<V>,
    config: Arc<AuthConfig>,
}

impl<V> VerifyTokenUseCase<V>
where
    V: IdTokenVerifier,
{
    pub fn new(verifier: Arc<V>, config: Arc<AuthConfig>) -> Self {
        Self { verifier, config }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<VerifiedIdentity> {
        if token.is_empty() {
            return Err(AuthError::TokenMissing);
        }

        let now = Utc::now().timestamp();
        let claims = match self.verifier.fetch_claims(token).await {
            Ok(claims) => claims,
            // the provider does not say why it refused; an expired token gets a sign-in prompt
            Err(AuthError::InvalidToken(_)) if claims_say_expired(token, now) => {
                return Err(AuthError::TokenExpired);
            }
            Err(e) => return Err(e),
        };
        let identity = validate_claims(
            claims,
            &self.config.client_id,
            &self.config.allowed_issuers,
            now,
        )?;

        tracing::debug!(user_id = %identity.user_id, "Identity token verified");
        Ok(identity)
    }
}
