//! Process configuration, read from the environment once at startup.

use std::net::{Ipv4Addr, SocketAddr};

use chrono::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 24 * 60;
/// Ten years. Longer lifetimes are rejected so expiry stays representable.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 10 * 366 * 24 * 60;
pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is required")]
    Missing { name: &'static str },

    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Server configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// `None` runs the server against in-memory stores.
    pub database_url: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_var)
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
                expected: "a port number",
            })?,
            None => DEFAULT_PORT,
        };

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let token_ttl = match lookup("TOKEN_TTL_MINUTES") {
            Some(raw) => {
                let ttl = raw
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .filter(|minutes| (1..=MAX_TOKEN_TTL_MINUTES).contains(minutes))
                    .and_then(Duration::try_minutes);
                ttl.ok_or(ConfigError::Invalid {
                    name: "TOKEN_TTL_MINUTES",
                    value: raw,
                    expected: "a positive number of minutes, at most ten years",
                })?
            }
            None => Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        };

        let database_url = lookup("DATABASE_URL");
        if database_url.is_none() {
            tracing::warn!("DATABASE_URL not set; data is kept in memory and lost on exit");
        }

        Ok(Self {
            port,
            jwt_secret,
            token_ttl,
            database_url,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

/// Settings for the admin seeding binary.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSeedConfig {
    pub email: String,
    pub password: String,
    pub database_url: Option<String>,
}

impl std::fmt::Debug for AdminSeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeedConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AdminSeedConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_var)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            email: lookup("ADMIN_EMAIL").ok_or(ConfigError::Missing { name: "ADMIN_EMAIL" })?,
            password: lookup("ADMIN_PASSWORD").ok_or(ConfigError::Missing { name: "ADMIN_PASSWORD" })?,
            database_url: lookup("DATABASE_URL"),
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(vars(&[])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.token_ttl, Duration::hours(24));
        assert_eq!(config.database_url, None);
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8081");
    }

    #[test]
    fn reads_explicit_values() {
        let config = Config::from_lookup(vars(&[
            ("PORT", "9000"),
            ("JWT_SECRET", "s3cret"),
            ("TOKEN_TTL_MINUTES", "15"),
            ("DATABASE_URL", "postgres://localhost/delivery"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.token_ttl, Duration::minutes(15));
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/delivery"));
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = Config::from_lookup(vars(&[("JWT_SECRET", ""), ("DATABASE_URL", "  ")])).unwrap();
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn invalid_numbers_are_errors() {
        let err = Config::from_lookup(vars(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        let err = Config::from_lookup(vars(&[("TOKEN_TTL_MINUTES", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "TOKEN_TTL_MINUTES", .. }));
    }

    #[test]
    fn oversized_token_ttl_is_an_error() {
        let max = i64::MAX.to_string();
        for raw in [max.as_str(), "1000000000000"] {
            let err = Config::from_lookup(vars(&[("TOKEN_TTL_MINUTES", raw)])).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { name: "TOKEN_TTL_MINUTES", .. }), "{raw}");
        }

        let ceiling = MAX_TOKEN_TTL_MINUTES.to_string();
        let config = Config::from_lookup(vars(&[("TOKEN_TTL_MINUTES", ceiling.as_str())])).unwrap();
        assert!(chrono::Utc::now().checked_add_signed(config.token_ttl).is_some());
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = Config::from_lookup(vars(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert!(!format!("{config:?}").contains("s3cret"));
    }

    #[test]
    fn admin_seed_requires_credentials() {
        let err = AdminSeedConfig::from_lookup(vars(&[("ADMIN_EMAIL", "a@b.c")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing { name: "ADMIN_PASSWORD" });

        let seed = AdminSeedConfig::from_lookup(vars(&[
            ("ADMIN_EMAIL", "a@b.c"),
            ("ADMIN_PASSWORD", "pw"),
        ]))
        .unwrap();
        assert_eq!(seed.email, "a@b.c");
        assert_eq!(seed.database_url, None);
    }
}
