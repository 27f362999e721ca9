//! Bearer token issuing and verification.
//!
//! Tokens are HS256 JWTs signed with the configured secret and carry the user id
//! in the `id` claim. Unless a lifetime is configured they carry no `exp`, so a
//! token stays valid until the secret changes.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

/// Claims stored in a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub id: String,
    /// Issued-at timestamp
    pub iat: i64,
    /// Expiry timestamp, only present when a token lifetime is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token expired")]
    Expired,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token generation failed: {0}")]
    Encode(String),
}

/// The authenticated caller, injected into request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self { id: claims.id }
    }
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Option<Duration>,
}

impl TokenService {
    pub fn new(secret: &str, ttl_minutes: Option<i64>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: ttl_minutes.map(Duration::minutes),
        }
    }

    pub fn from_config(cfg: &AuthConfig) -> Self {
        Self::new(&cfg.jwt_secret, cfg.token_ttl_minutes)
    }

    /// Signs a token for `user_id`.
    pub fn issue(&self, user_id: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            id: user_id.to_string(),
            iat: now.timestamp(),
            exp: self.ttl.map(|ttl| (now + ttl).timestamp()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verifies the signature (and the expiry, when the token has one) and returns the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is optional: tokens issued without a lifetime must still verify.
        validation.required_spec_claims.clear();
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Invalid(e.to_string()),
        })?;

        if data.claims.id.is_empty() {
            return Err(TokenError::Invalid("missing id claim".to_string()));
        }
        Ok(data.claims)
    }

    /// Extracts the token from an `Authorization` header value of the form `Bearer <token>`.
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_round_trip() {
        let svc = TokenService::new("test-secret", None);
        let token = svc.issue("user-1").unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.id, "user-1");
        assert!(claims.exp.is_none());
    }

    #[test]
    fn test_ttl_sets_expiry() {
        let svc = TokenService::new("test-secret", Some(60));
        let token = svc.issue("user-1").unwrap();
        let claims = svc.verify(&token).unwrap();
        let exp = claims.exp.expect("exp claim");
        assert!(exp > claims.iat);
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = TokenService::new("test-secret", Some(-5));
        let token = svc.issue("user-1").unwrap();
        assert!(matches!(svc.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenService::new("secret-a", None);
        let verifier = TokenService::new("secret-b", None);
        let token = issuer.issue("user-1").unwrap();
        assert!(matches!(verifier.verify(&token), Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_garbage_rejected() {
        let svc = TokenService::new("test-secret", None);
        assert!(svc.verify("not.a.token").is_err());
        assert!(svc.verify("").is_err());
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(TokenService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(TokenService::extract_from_header("Bearer "), None);
        assert_eq!(TokenService::extract_from_header("Basic abc"), None);
        assert_eq!(TokenService::extract_from_header("Bearerabc"), None);
    }
}
