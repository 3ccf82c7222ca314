//! Signed bearer tokens: issue and validate `{sub, exp, iat}` claims with a
//! process-wide symmetric secret. Validation is pure and consults no store;
//! expiry is the only termination mechanism (no revocation list).

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default token lifetime: 24 hours.
pub const DEFAULT_TTL_MINUTES: i64 = 1440;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token cannot be parsed or its signature does not verify.
    #[error("malformed token")]
    Malformed,
    /// The token parsed and verified but its expiry is in the past.
    #[error("expired token")]
    Expired,
}

/// Stateless issuer/validator around a shared signing secret.
///
/// The secret is fixed at construction and is the sole root of trust; the
/// signature check underneath (HMAC-SHA256 via jsonwebtoken) compares in
/// constant time. Expiry is checked against an explicit clock so tests can
/// pin time; the convenience wrappers use `Utc::now()`.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into(), ttl: Duration::minutes(DEFAULT_TTL_MINUTES) }
    }

    pub fn with_ttl_minutes(secret: impl Into<String>, minutes: i64) -> Self {
        Self { secret: secret.into(), ttl: Duration::minutes(minutes) }
    }

    /// Issue a token for `subject` expiring `ttl` from now.
    pub fn issue(&self, subject: &str) -> Result<String> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|e| anyhow!("token encode failed: {}", e))
    }

    /// Validate a token and return its subject id.
    pub fn validate(&self, token: &str) -> Result<String, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Expiry is compared against the supplied clock, not the library's, so
    /// there is no leeway window: `exp <= now` is expired.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let data = decode::<Claims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &validation)
            .map_err(|_| TokenError::Malformed)?;
        if data.claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(data.claims.sub)
    }
}
