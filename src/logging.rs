//! Tracing subscriber setup for the binary

use tracing_subscriber::EnvFilter;

/// Filter variable consulted before the configured level
pub const ENV_LOG: &str = "CLEANSTATION_LOG";

/// Pick the filter directive: `CLEANSTATION_LOG` if set and non-empty,
/// otherwise `fallback`
pub fn filter_directive(env_value: Option<String>, fallback: &str) -> String {
    env_value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Install the global subscriber, writing to stderr
///
/// Safe to call more than once; later calls are ignored.
pub fn init(fallback_level: &str) {
    let directive = filter_directive(std::env::var(ENV_LOG).ok(), fallback_level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
