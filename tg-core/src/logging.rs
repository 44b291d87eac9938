//! Crate-standard logging setup.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `env_filter` accepts anything [`EnvFilter`] understands, from a bare level (`info`) to
/// per-target directives (`tg_gen=debug,warn`). An unparseable filter falls back to `info`.
pub fn setup(env_filter: &str) {
    let filter = EnvFilter::try_new(env_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let res = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .try_init();

    // Tests and embedding applications may already have installed a subscriber.
    if let Err(e) = res {
        tracing::debug!("logging already initialized: {e}");
    }
}
