//! Authentication primitives: bcrypt password hashing and JWT bearer tokens.
//!
//! Tokens carry the account id and role; admin-only surfaces check the role
//! claim after signature verification.

use crate::errors::{ServiceError, ServiceResult};
use crate::types::UserId;
use crate::user::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default token lifetime: 7 days.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 7;

/// Claims carried in a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account id.
    pub sub: Uuid,
    /// Account role at issue time.
    pub role: Role,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiry (Unix timestamp).
    pub exp: i64,
}

/// Issues and verifies bearer tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer with the given secret and token lifetime in hours.
    pub fn new(secret: impl Into<Vec<u8>>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a signed token for an account.
    pub fn issue(&self, user: UserId, role: Role) -> ServiceResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.into_inner(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|err| ServiceError::Store(crate::errors::StoreError::Backend(err.to_string())))
    }

    /// Verify a token's signature and expiry, returning its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}

/// Token verification failures, mapped to 401 by the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No bearer token on the request.
    #[error("Not authenticated")]
    MissingToken,
    /// Signature or expiry check failed.
    #[error("Invalid or expired token")]
    InvalidToken,
}

/// Hash a password with bcrypt at the default cost.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|err| ServiceError::Store(crate::errors::StoreError::Backend(err.to_string())))
}

/// Verify a password against a stored bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Password policy: at least 6 characters including a digit.
pub fn check_password_policy(password: &str) -> ServiceResult<()> {
    if password.len() < 6 {
        return Err(ServiceError::validation(
            "Password must be at least 6 characters",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ServiceError::validation(
            "Password must contain at least one number",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify_roundtrip() {
        let issuer = TokenIssuer::new("test-secret", 1);
        let user = UserId::new();
        let token = issuer.issue(user, Role::Admin).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, user.into_inner());
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = TokenIssuer::new("secret-a", 1);
        let token = issuer.issue(UserId::new(), Role::User).unwrap();

        let other = TokenIssuer::new("secret-b", 1);
        assert_eq!(other.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let issuer = TokenIssuer::new("secret", 1);
        assert_eq!(issuer.verify("not.a.token"), Err(AuthError::InvalidToken));
    }

    #[test]
    fn password_policy() {
        assert!(check_password_policy("abc1234").is_ok());
        assert!(check_password_policy("short").is_err());
        assert!(check_password_policy("nodigits").is_err());
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("hunter42").unwrap();
        assert!(verify_password("hunter42", &hash));
        assert!(!verify_password("hunter43", &hash));
    }
}
