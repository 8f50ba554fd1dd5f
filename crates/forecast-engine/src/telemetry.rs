//! Tracing subscriber setup for hosts and tests

use std::sync::Once;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "FORECAST_LOG";

const DEFAULT_FILTER: &str = "forecast=info";

static INIT: Once = Once::new();

/// Install a human-readable subscriber
///
/// Reads per-crate levels from `FORECAST_LOG`, e.g.
/// `FORECAST_LOG=forecast_matrix=debug,forecast_cache=warn`, falling back
/// to `forecast=info`. Idempotent; does nothing when another global
/// subscriber is already installed.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_line_number(true))
            .with(filter)
            .try_init();
    });
}

/// Install a JSON subscriber with an explicit filter
///
/// Shares the once-only guard with [`init_tracing`].
pub fn init_json_tracing(filter: &str) {
    let filter = EnvFilter::new(filter);
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init();
    });
}
