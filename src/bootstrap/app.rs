//! Setup for the main application.
use std::sync::Arc;

use transfer_bench_configuration::{Configuration, Info};

use crate::core::Tracker;

/// The default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "./transfer-bench.toml";

/// Loads the configuration from the default file location, overridden by
/// the `TRANSFER_BENCH_`-prefixed environment variables.
///
/// # Panics
///
/// Will panic if the configuration cannot be parsed.
#[must_use]
pub fn config() -> Configuration {
    let info = Info::from_env(DEFAULT_CONFIG_PATH.to_owned());

    Configuration::load(&info).expect("the configuration should be loadable")
}

/// Sets up logging and builds the tracker from the configuration.
#[must_use]
pub fn initialize_with_configuration(config: &Configuration) -> Arc<Tracker> {
    crate::bootstrap::logging::setup(config);

    Arc::new(Tracker::new(config))
}
