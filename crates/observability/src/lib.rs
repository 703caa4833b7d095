//! Tracing and logging setup shared by the service binaries.

/// Initialize process-wide logging.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init("info");
}

/// Tracing subscriber configuration.
pub mod tracing;
