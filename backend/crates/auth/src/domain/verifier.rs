//! Identity Provider Port
//!
//! Implementation is in infrastructure layer.

use serde::{Deserialize, Deserializer};

use crate::error::AuthResult;

/// Claims reported by the identity provider for an ID token.
///
/// Providers disagree on whether `exp` is a number or a numeric string, so
/// both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    #[serde(deserialize_with = "timestamp")]
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

fn timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
    }
}

/// ID token verifier trait
#[trait_variant::make(IdTokenVerifier: Send)]
pub trait LocalIdTokenVerifier {
    /// Ask the provider for the claims of `token`.
    ///
    /// Fails with `InvalidToken` if the provider rejects the token and with
    /// `ProviderUnavailable` if it cannot be reached. Audience, issuer and
    /// expiry are checked by the caller.
    async fn fetch_claims(&self, token: &str) -> AuthResult<TokenClaims>;
}
