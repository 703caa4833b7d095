use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Role identifier used for route authorization.
///
/// Closed set: every protected route names one of these, and matching on it
/// is exhaustive.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Deliverer account. Default for self-registered users.
    #[default]
    Delivery,
    /// Back-office account with access to the admin panel.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Delivery => "delivery",
            Role::Admin => "admin",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delivery" => Ok(Role::Delivery),
            "admin" => Ok(Role::Admin),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"delivery\"").unwrap();
        assert_eq!(role, Role::Delivery);
    }

    #[test]
    fn parses_stored_names() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Delivery.as_str().parse::<Role>().unwrap(), Role::Delivery);
        assert!("root".parse::<Role>().is_err());
    }
}
