use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

fn filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install a human-readable subscriber. `RUST_LOG` overrides `default_filter`.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter(default_filter))
        .try_init()
        .is_ok()
}

/// Install a subscriber that writes JSON lines with RFC 3339 UTC timestamps.
pub fn init_json_tracing(default_filter: &str) -> bool {
    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_timer(UtcTime::rfc_3339());

    tracing_subscriber::registry()
        .with(filter(default_filter))
        .with(layer)
        .try_init()
        .is_ok()
}
