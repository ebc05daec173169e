//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber with the default `info` filter
pub fn init_tracing() {
    init_tracing_with_filter("info");
}

/// Initialize tracing with a custom default filter, honoring `RUST_LOG`
/// when set. Safe to call from a binary exactly once.
pub fn init_tracing_with_filter(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Like [`init_tracing_with_filter`] but with JSON-formatted output, for
/// environments that ship logs to a collector
pub fn init_tracing_json(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
