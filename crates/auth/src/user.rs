//! User accounts (credential store records).
//!
//! Users are created at registration and never mutated through the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use delivery_core::{require_text, DomainError, DomainResult, Email, Entity, UserId};

use crate::{Principal, Role};

/// A stored account.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl User {
    /// Build a new account from a validated registration and a password hash.
    pub fn new(
        name: String,
        email: Email,
        password_hash: String,
        role: Role,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            name,
            email,
            password_hash,
            role,
            created_at: occurred_at,
            updated_at: occurred_at,
        }
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.id, self.role)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.to_string(),
            role: self.role,
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Public view of an account (never carries the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub password: String,
}

impl Registration {
    /// Validate raw registration fields. Every field is required.
    pub fn parse(name: Option<&str>, email: Option<&str>, password: Option<&str>) -> DomainResult<Self> {
        let name = require_text(name, "name, email and password are required")?;
        let email = require_text(email, "name, email and password are required")?;
        let password = require_password(password, "name, email and password are required")?;

        Ok(Self {
            name,
            email: Email::parse(&email)?,
            password,
        })
    }
}

/// Validated login input.
///
/// `email` is `None` when the supplied address is malformed. No account can
/// hold such an address, so login treats it like an unknown email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: Option<Email>,
    pub password: String,
}

impl Credentials {
    pub fn parse(email: Option<&str>, password: Option<&str>) -> DomainResult<Self> {
        let email = require_text(email, "email and password are required")?;
        let password = require_password(password, "email and password are required")?;

        Ok(Self {
            email: Email::parse(&email).ok(),
            password,
        })
    }
}

// Passwords are not trimmed; only emptiness is rejected.
fn require_password(password: Option<&str>, message: &str) -> DomainResult<String> {
    match password {
        Some(p) if !p.is_empty() => Ok(p.to_string()),
        _ => Err(DomainError::validation(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_normalises_fields() {
        let reg = Registration::parse(Some("  Ann Rider "), Some("Ann@Example.com"), Some(" pw ")).unwrap();
        assert_eq!(reg.name, "Ann Rider");
        assert_eq!(reg.email.as_str(), "ann@example.com");
        // Passwords are taken verbatim.
        assert_eq!(reg.password, " pw ");
    }

    #[test]
    fn registration_requires_every_field() {
        for (n, e, p) in [
            (None, Some("a@b.c"), Some("pw")),
            (Some("Ann"), None, Some("pw")),
            (Some("Ann"), Some("a@b.c"), None),
            (Some(""), Some("a@b.c"), Some("pw")),
            (Some("Ann"), Some("a@b.c"), Some("")),
        ] {
            assert!(matches!(Registration::parse(n, e, p), Err(DomainError::Validation(_))));
        }
    }

    #[test]
    fn profile_hides_hash() {
        let user = User::new(
            "Ann".into(),
            Email::parse("ann@example.com").unwrap(),
            "$argon2id$secret".into(),
            Role::Delivery,
            Utc::now(),
        );
        let json = serde_json::to_value(user.profile()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "delivery");
        assert!(!format!("{user:?}").contains("secret"));
    }

    #[test]
    fn credentials_require_both_fields() {
        assert!(Credentials::parse(Some("a@b.c"), Some("pw")).is_ok());
        assert!(Credentials::parse(Some("a@b.c"), None).is_err());
        assert!(Credentials::parse(None, Some("pw")).is_err());
    }

    #[test]
    fn malformed_login_email_is_not_a_validation_error() {
        let creds = Credentials::parse(Some("nobody"), Some("pw")).unwrap();
        assert_eq!(creds.email, None);

        let creds = Credentials::parse(Some(" Ann@Example.com "), Some("pw")).unwrap();
        assert_eq!(creds.email.map(Email::into_inner).as_deref(), Some("ann@example.com"));
    }
}
