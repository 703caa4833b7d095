//! Password hashing (Argon2id, PHC string format).

use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::AuthError;

/// Hash a password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Verify a password against a hash that may not exist.
///
/// When `hash` is `None` (unknown account) a verification still runs against
/// a fixed dummy hash, so both failure paths cost about the same and return
/// the same error.
pub fn verify_password_or_dummy(password: &str, hash: Option<&str>) -> Result<(), AuthError> {
    match hash {
        Some(hash) => verify_password(password, hash),
        None => {
            if let Some(dummy) = dummy_hash() {
                let _ = verify_password(password, dummy);
            }
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Compute the dummy hash now, so the first unknown-account login does not
/// pay for hashing on top of the verification.
pub fn warm_dummy_hash() {
    if dummy_hash().is_none() {
        tracing::warn!("dummy password hash unavailable; unknown-account logins skip verification");
    }
}

static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH
        .get_or_init(|| hash_password("dummy-password-for-unknown-accounts").ok())
        .as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_not_plaintext_and_verifies() {
        let hash = hash_password("hunter22").unwrap();
        assert!(!hash.contains("hunter22"));
        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(verify_password("hunter22", &hash), Ok(()));
        assert_eq!(verify_password("hunter23", &hash), Err(AuthError::InvalidCredentials));
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn unknown_account_fails_like_a_wrong_password() {
        let hash = hash_password("right").unwrap();
        assert_eq!(
            verify_password_or_dummy("wrong", Some(&hash)),
            verify_password_or_dummy("wrong", None)
        );
    }

    #[test]
    fn warming_prepares_the_dummy_hash() {
        warm_dummy_hash();
        let dummy = DUMMY_HASH.get().and_then(|h| h.as_deref()).unwrap();
        assert!(dummy.starts_with("$argon2id$"));
    }

    #[test]
    fn corrupt_hash_is_a_credential_failure() {
        assert_eq!(verify_password("x", "not-a-phc-string"), Err(AuthError::InvalidCredentials));
    }
}
