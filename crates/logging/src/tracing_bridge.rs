//! crates/logging/src/tracing_bridge.rs
//! Subscriber setup bridging [`VerbosityConfig`] with `tracing-subscriber`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use logging::{VerbosityConfig, init_tracing};
//!
//! init_tracing(VerbosityConfig::from_verbose_level(2));
//! tracing::debug!(target: "sha::dispatch", "engine ready");
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use super::config::VerbosityConfig;

fn filter_for(config: &VerbosityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directive()))
}

/// Install a global subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this twice
/// is a no-op for the second call.
pub fn init_tracing(config: VerbosityConfig) {
    let _ = try_init_tracing(config);
}

/// Install a global subscriber, reporting whether one was already set.
pub fn try_init_tracing(config: VerbosityConfig) -> Result<(), TryInitError> {
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.show_targets);

    tracing_subscriber::registry()
        .with(filter_for(&config))
        .with(fmt)
        .try_init()
}
