use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global `fmt` subscriber. `RUST_LOG` overrides the default
/// `info` filter.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt().with_env_filter(filter).try_init() {
        warn!(error = %e, "tracing init failed");
    }
}
