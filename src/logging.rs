//! Tracing subscriber setup
//!
//! Logs go to stderr so they never mix with the transcript on stdout.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_PORTFOLIO_SHELL_LOG: &str = "PORTFOLIO_SHELL_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Filter from `PORTFOLIO_SHELL_LOG`, falling back to `warn` when it is unset
/// or does not parse.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(ENV_PORTFOLIO_SHELL_LOG)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn build_subscriber(filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry().with(fmt_layer).with(filter)
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init() {
    let _ = build_subscriber(env_filter()).try_init();
}
