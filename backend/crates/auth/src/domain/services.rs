//! Domain Services
//!
//! Pure claim validation.

use platform::crypto::from_base64_url;
use serde::Deserialize;

use crate::domain::entity::identity::VerifiedIdentity;
use crate::domain::value_object::user_id::UserId;
use crate::domain::verifier::TokenClaims;
use crate::error::{AuthError, AuthResult};

/// Check provider claims against the expected audience, issuers and clock.
pub fn validate_claims(
    claims: TokenClaims,
    audience: &str,
    allowed_issuers: &[String],
    now_secs: i64,
) -> AuthResult<VerifiedIdentity> {
    if claims.aud != audience {
        return Err(AuthError::InvalidToken("audience mismatch".to_string()));
    }

    if !allowed_issuers.iter().any(|iss| *iss == claims.iss) {
        return Err(AuthError::InvalidToken(format!(
            "unexpected issuer {}",
            claims.iss
        )));
    }

    if claims.exp <= now_secs {
        return Err(AuthError::TokenExpired);
    }

    let user_id = UserId::new(claims.sub)
        .ok_or_else(|| AuthError::InvalidToken("missing subject".to_string()))?;

    Ok(VerifiedIdentity {
        user_id,
        email: claims.email.filter(|e| !e.is_empty()),
        name: claims.name.filter(|n| !n.is_empty()),
        picture: claims.picture.filter(|p| !p.is_empty()),
    })
}

/// Whether the unverified payload of a JWT says it has expired.
///
/// Only used to word a rejection the provider already made; never trusted to
/// accept a token. Anything that is not a readable JWT counts as not expired.
pub fn claims_say_expired(token: &str, now_secs: i64) -> bool {
    #[derive(Deserialize)]
    struct Expiry {
        exp: i64,
    }

    let mut segments = token.split('.');
    let (Some(_), Some(payload), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return false;
    };

    from_base64_url(payload)
        .ok()
        .and_then(|bytes| serde_json::from_slice::<Expiry>(&bytes).ok())
        .is_some_and(|expiry| expiry.exp <= now_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUD: &str = "client-123.apps.googleusercontent.com";
    const NOW: i64 = 1_760_000_000;

    fn issuers() -> Vec<String> {
        vec![
            "accounts.google.com".to_string(),
            "https://accounts.google.com".to_string(),
        ]
    }

    fn claims() -> TokenClaims {
        TokenClaims {
            iss: "https://accounts.google.com".to_string(),
            aud: AUD.to_string(),
            sub: "1092".to_string(),
            exp: NOW + 600,
            email: Some("mary@example.com".to_string()),
            name: Some("Mary".to_string()),
            picture: Some(String::new()),
        }
    }

    #[test]
    fn test_valid_claims() {
        let identity = validate_claims(claims(), AUD, &issuers(), NOW).unwrap();
        assert_eq!(identity.user_id.as_str(), "1092");
        assert_eq!(identity.email.as_deref(), Some("mary@example.com"));
        assert_eq!(identity.name.as_deref(), Some("Mary"));
        // empty picture is dropped
        assert!(identity.picture.is_none());
    }

    #[test]
    fn test_wrong_audience() {
        let mut c = claims();
        c.aud = "someone-else".to_string();
        let err = validate_claims(c, AUD, &issuers(), NOW).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_wrong_issuer() {
        let mut c = claims();
        c.iss = "https://evil.example".to_string();
        assert!(validate_claims(c, AUD, &issuers(), NOW).is_err());
    }

    #[test]
    fn test_expired() {
        let mut c = claims();
        c.exp = NOW;
        let err = validate_claims(c, AUD, &issuers(), NOW).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn test_claims_say_expired() {
        // payloads {"exp":1} and {"exp":9999999999}
        assert!(claims_say_expired("e30.eyJleHAiOjF9.sig", NOW));
        assert!(!claims_say_expired("e30.eyJleHAiOjk5OTk5OTk5OTl9.sig", NOW));
        assert!(!claims_say_expired("forged", NOW));
        assert!(!claims_say_expired("e30.bm90IGpzb24.sig", NOW));
        assert!(!claims_say_expired("e30.eyJleHAiOjF9.sig.extra", NOW));
    }

    #[test]
    fn test_blank_subject() {
        let mut c = claims();
        c.sub = String::new();
        assert!(validate_claims(c, AUD, &issuers(), NOW).is_err());
    }
}
