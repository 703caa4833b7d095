//! Bearer token issuance and verification (HS256 JWT).
//!
//! Expiry is checked by [`validate_claims`] against a caller-supplied clock
//! rather than by the JWT library, so tests can drive time explicitly.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::{validate_claims, AuthError, JwtClaims, Principal};

/// Verifies a bearer token and yields its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, AuthError>;
}

impl<V> JwtValidator for Arc<V>
where
    V: JwtValidator + ?Sized,
{
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, AuthError> {
        (**self).validate(token, now)
    }
}

/// A freshly signed token and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Symmetric-key JWT signer/validator.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256Jwt {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `principal`, valid from `now` for the configured TTL.
    pub fn issue(&self, principal: &Principal, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let claims = JwtClaims::new(principal, now, self.ttl)?;
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, AuthError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &Self::validation())
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                AuthError::InvalidToken
            })?;

        validate_claims(&data.claims, now).map_err(|e| {
            tracing::debug!(error = %e, sub = %data.claims.sub, "token rejected");
            AuthError::InvalidToken
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use delivery_core::UserId;

    use super::*;
    use crate::Role;

    fn jwt(secret: &str) -> Hs256Jwt {
        Hs256Jwt::new(secret.as_bytes(), Duration::minutes(30))
    }

    #[test]
    fn issued_token_round_trips_identity() {
        let signer = jwt("s3cret");
        let principal = Principal::new(UserId::new(), Role::Admin);
        let now = Utc::now();

        let issued = signer.issue(&principal, now).unwrap();
        let claims = signer.validate(&issued.token, now).unwrap();

        assert_eq!(claims.principal(), principal);
        assert_eq!(issued.expires_at.timestamp(), (now + Duration::minutes(30)).timestamp());
    }

    #[test]
    fn rejects_after_expiry() {
        let signer = jwt("s3cret");
        let now = Utc::now();
        let issued = signer
            .issue(&Principal::new(UserId::new(), Role::Delivery), now)
            .unwrap();

        assert_eq!(
            signer.validate(&issued.token, now + Duration::minutes(31)),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn rejects_foreign_signature() {
        let now = Utc::now();
        let forged = jwt("other")
            .issue(&Principal::new(UserId::new(), Role::Admin), now)
            .unwrap();

        assert_eq!(jwt("s3cret").validate(&forged.token, now), Err(AuthError::InvalidToken));
    }

    #[test]
    fn rejects_garbage_and_tampering() {
        let signer = jwt("s3cret");
        let now = Utc::now();
        assert_eq!(signer.validate("not.a.jwt", now), Err(AuthError::InvalidToken));

        let issued = signer
            .issue(&Principal::new(UserId::new(), Role::Delivery), now)
            .unwrap();
        let mut parts: Vec<&str> = issued.token.split('.').collect();
        // Swap in an admin payload under the delivery token's signature.
        let admin = signer
            .issue(&Principal::new(UserId::new(), Role::Admin), now)
            .unwrap();
        let admin_payload = admin.token.split('.').nth(1).unwrap().to_string();
        parts[1] = &admin_payload;
        let tampered = parts.join(".");

        assert_eq!(signer.validate(&tampered, now), Err(AuthError::InvalidToken));
    }
}
