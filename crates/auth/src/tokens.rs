//! Signed session tokens (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use thiserror::Error;

use crate::{validate_claims, Role, SessionClaims, TokenValidationError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed or badly signed token: {0}")]
    Invalid(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// A freshly issued token as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issue and check session tokens.
pub trait SessionTokens: Send + Sync {
    fn issue(&self, subject: &str, role: Role, now: DateTime<Utc>) -> Result<IssuedToken, TokenError>;

    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError>;
}

/// HMAC-SHA256 tokens with a fixed lifetime.
#[derive(Clone)]
pub struct Hs256Tokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256Tokens {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

impl SessionTokens for Hs256Tokens {
    fn issue(&self, subject: &str, role: Role, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.ttl;
        let claims = SessionClaims {
            sub: subject.to_string(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }

    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        // Time checks run against the caller's clock in `validate_claims`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Hs256Tokens {
        Hs256Tokens::new(b"test-secret", Duration::minutes(30))
    }

    #[test]
    fn issue_then_validate() {
        let now = Utc::now();
        let issued = tokens().issue("admin", Role::ADMIN, now).expect("issue");
        assert_eq!(issued.expires_at, now + Duration::minutes(30));

        let claims = tokens().validate(&issued.token, now).expect("validate");
        assert_eq!(claims.sub, "admin");
        assert!(claims.role.is_admin());
    }

    #[test]
    fn rejects_other_secret() {
        let now = Utc::now();
        let issued = tokens().issue("admin", Role::ADMIN, now).expect("issue");
        let other = Hs256Tokens::new(b"another-secret", Duration::minutes(30));
        assert!(matches!(other.validate(&issued.token, now), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn rejects_after_expiry() {
        let now = Utc::now();
        let issued = tokens().issue("admin", Role::ADMIN, now).expect("issue");
        let later = now + Duration::minutes(31);
        assert_eq!(
            tokens().validate(&issued.token, later),
            Err(TokenError::Claims(TokenValidationError::Expired))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            tokens().validate("not.a.token", Utc::now()),
            Err(TokenError::Invalid(_))
        ));
    }
}
