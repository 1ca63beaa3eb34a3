//! Structured logging setup for the command-line entry points

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter: info for this crate, warn for everything else
pub const DEFAULT_LOG_FILTER: &str = "crop_recommender=info,warn";

/// Initialize tracing from `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`]
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
