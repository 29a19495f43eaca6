//! Tracing bootstrap
//!
//! Call [`init_tracing`] once at process startup. Log verbosity follows
//! the `ROSTERLINK_LOG` environment variable with the usual `EnvFilter`
//! directive syntax (`info`, `rosterlink_core=debug`, ...), defaulting to
//! `info`.

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter directives.
pub const LOG_FILTER_ENV: &str = "ROSTERLINK_LOG";

/// Install the global tracing subscriber.
///
/// Safe to call more than once: subsequent calls are no-ops because a
/// global subscriber can only be installed once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
