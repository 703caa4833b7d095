//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**; two instances
/// with the same attributes are interchangeable.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// A normalised email address.
///
/// Emails are trimmed and lower-cased on construction, so equality is
/// case-insensitive and the stored form is canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse and normalise an email address.
    ///
    /// Only presence and a single `@` with text on both sides are checked.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let normalised = raw.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(DomainError::validation("email is required"));
        }

        match normalised.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
                Ok(Self(normalised))
            }
            _ => Err(DomainError::validation("email is malformed")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl ValueObject for Email {}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
