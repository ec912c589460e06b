//! Subscriber setup for binaries and tests.
//!
//! Library crates only emit `tracing` events; installing a subscriber is
//! left to the application, once, through [`init_logging`].

use sp_core::errors::{Error, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` when set and valid, `directives` otherwise.
pub fn env_filter(directives: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(directives).map_err(|e| Error::Config(format!("log filter {directives:?}: {e}"))),
    }
}

/// Install a formatting subscriber filtered by [`env_filter`].
///
/// Fails with `Error::Config` on a bad filter or when a global subscriber
/// is already installed.
pub fn init_logging(directives: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(env_filter(directives)?)
        .try_init()
        .map_err(|e| Error::Config(e.to_string()))
}
