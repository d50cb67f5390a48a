//! Identity Middleware
//!
//! Resolves the optional bearer token on every request and stores the result
//! in request extensions. Routes that need a signed-in user call
//! [`CurrentIdentity::require`].

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::Request;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::client::{extract_bearer_token, has_authorization};

use crate::application::config::AuthConfig;
use crate::application::verify_token::VerifyTokenUseCase;
use crate::domain::entity::identity::VerifiedIdentity;
use crate::domain::verifier::IdTokenVerifier;
use crate::error::{AuthError, AuthResult};

/// Middleware state
pub struct IdentityState<V>
where
    V: IdTokenVerifier,
{
    pub verifier: Arc<V>,
    pub config: Arc<AuthConfig>,
}

impl<V> Clone for IdentityState<V>
where
    V: IdTokenVerifier,
{
    fn clone(&self) -> Self {
        Self {
            verifier: self.verifier.clone(),
            config: self.config.clone(),
        }
    }
}

/// Identity of the caller, `None` for anonymous requests.
#[derive(Debug, Clone, Default)]
pub struct CurrentIdentity(pub Option<VerifiedIdentity>);

impl CurrentIdentity {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn get(&self) -> Option<&VerifiedIdentity> {
        self.0.as_ref()
    }

    /// The verified identity, or `MissingAuthorization`.
    pub fn require(&self) -> AuthResult<&VerifiedIdentity> {
        self.0.as_ref().ok_or(AuthError::MissingAuthorization)
    }
}

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentIdentity>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Middleware that verifies a bearer token when one is sent.
///
/// No Authorization header: the request continues as anonymous.
/// Header without token or token expired: 401. Token rejected: 403.
pub async fn resolve_identity<V>(
    State(state): State<IdentityState<V>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    V: IdTokenVerifier + Send + Sync + 'static,
{
    let identity = if has_authorization(req.headers()) {
        let token = match extract_bearer_token(req.headers()) {
            Ok(token) => token,
            Err(e) => return AuthError::from(e).into_response(),
        };

        let use_case = VerifyTokenUseCase::new(state.verifier.clone(), state.config.clone());
        match use_case.execute(&token).await {
            Ok(identity) => Some(identity),
            Err(e) => return e.into_response(),
        }
    } else {
        None
    };

    req.extensions_mut().insert(CurrentIdentity(identity));

    next.run(req).await
}
