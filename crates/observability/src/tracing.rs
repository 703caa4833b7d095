//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Levels for chatty dependencies when `RUST_LOG` is unset.
const NOISY_DEPENDENCIES: &[&str] = &["sqlx=warn", "hyper=info", "tower_http=info"];

/// Build the filter: `RUST_LOG` if set, otherwise `default_level` plus quieter
/// defaults for chatty dependencies.
pub fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives = vec![default_level.to_string()];
        directives.extend(NOISY_DEPENDENCIES.iter().map(|d| d.to_string()));
        EnvFilter::new(directives.join(","))
    })
}

/// Install a JSON fmt subscriber with timestamps.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(default_level))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init("debug");
        init("info");
        ::tracing::info!("still logging");
    }
}
