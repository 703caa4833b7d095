//! HTTP API: configuration, routing, and request/response mapping.

pub mod app;
pub mod config;
pub mod middleware;

pub use app::{build_app, AppServices};
pub use config::{AdminSeedConfig, Config, ConfigError};
