//! Logging initialization
//!
//! Installs a `tracing` subscriber with env-filter support. Host binaries call
//! this once at startup; the library itself only emits events.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// The filter is taken from `RUST_LOG` when set, defaulting to `info`.
/// With `json_output` the formatter emits structured JSON lines for log
/// aggregation; otherwise a human-readable format is used.
pub fn init_logging(json_output: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    if json_output {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
