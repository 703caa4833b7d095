use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use delivery_core::UserId;

use crate::{AuthError, Principal, Role};

/// JWT claims model (transport-agnostic).
///
/// Timestamps are seconds since the Unix epoch, as registered JWT claims are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the user the token was issued to.
    pub sub: UserId,

    /// Role at the time of issue.
    pub role: Role,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

impl JwtClaims {
    /// Claims for `principal`, valid from `issued_at` for `ttl`.
    ///
    /// Fails with [`AuthError::Signing`] when the expiry is not a
    /// representable time.
    pub fn new(principal: &Principal, issued_at: DateTime<Utc>, ttl: Duration) -> Result<Self, AuthError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Signing(format!("token lifetime {ttl} overflows the expiry")))?;

        Ok(Self {
            sub: principal.id,
            role: principal.role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.sub, self.role)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of JWT claims.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::token`]. No leeway is applied.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_at(now: DateTime<Utc>, ttl: Duration) -> JwtClaims {
        JwtClaims::new(&Principal::new(UserId::new(), Role::Delivery), now, ttl).unwrap()
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let principal = Principal::new(UserId::new(), Role::Delivery);
        let err = JwtClaims::new(&principal, Utc::now(), Duration::MAX).unwrap_err();
        assert!(matches!(err, AuthError::Signing(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn valid_inside_window() {
        let now = Utc::now();
        let claims = claims_at(now, Duration::minutes(5));
        assert_eq!(validate_claims(&claims, now), Ok(()));
        assert_eq!(validate_claims(&claims, now + Duration::minutes(4)), Ok(()));
    }

    #[test]
    fn expired_at_exp_boundary() {
        let now = Utc::now();
        let claims = claims_at(now, Duration::minutes(5));
        assert_eq!(
            validate_claims(&claims, now + Duration::minutes(5)),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn rejects_future_iat_and_empty_window() {
        let now = Utc::now();
        let claims = claims_at(now + Duration::minutes(10), Duration::minutes(5));
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::NotYetValid));

        let empty = claims_at(now, Duration::zero());
        assert_eq!(
            validate_claims(&empty, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a token is accepted exactly on [iat, exp).
            #[test]
            fn accepted_only_inside_window(ttl_secs in 1i64..=86_400, offset in -86_400i64..=172_800) {
                let issued_at = Utc::now();
                let claims = claims_at(issued_at, Duration::seconds(ttl_secs));
                let now = issued_at + Duration::seconds(offset);

                let result = validate_claims(&claims, now);
                if offset < 0 {
                    prop_assert_eq!(result, Err(TokenValidationError::NotYetValid));
                } else if offset >= ttl_secs {
                    prop_assert_eq!(result, Err(TokenValidationError::Expired));
                } else {
                    prop_assert_eq!(result, Ok(()));
                }
            }
        }
    }
}
