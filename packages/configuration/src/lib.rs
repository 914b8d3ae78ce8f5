//! Configuration data structures for the transfer-bench services.
//!
//! The configuration is loaded from a [TOML](https://toml.io/en/) file
//! (`transfer-bench.toml` by default) or from an environment variable with
//! the same content as the file. Individual values can be overridden with
//! environment variables prefixed with `TRANSFER_BENCH_`.
//!
//! When you run the services without providing the configuration via a file
//! or env var, the default configuration is used.
//!
//! Each section in the toml structure is mapped to a data structure:
//!
//! - `[logging]` → [`Logging`]
//! - `[tracker]` → [`Tracker`]
//! - `[file_server]` → [`FileServer`]
//! - `[benchmark]` → [`Benchmark`]
use std::fs;

use derive_more::Constructor;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod benchmark;
pub mod file_server;
pub mod tracker;

pub use benchmark::{Benchmark, FileConfig};
pub use file_server::FileServer;
pub use tracker::Tracker;

/// The maximum number of returned peers for a torrent.
pub const TORRENT_PEERS_LIMIT: usize = 74;

/// Prefix for environment variables that override configuration values.
const CONFIG_OVERRIDE_PREFIX: &str = "TRANSFER_BENCH_";

/// The whole configuration file content, as TOML. It has priority over the
/// config file, even if the file is not on the default path.
pub const ENV_VAR_CONFIG_TOML: &str = "TRANSFER_BENCH_CONFIG_TOML";

/// Information required to load the configuration.
#[derive(Debug, Default, Clone, Constructor)]
pub struct Info {
    /// The whole configuration in TOML format, when injected via env var.
    pub config_toml: Option<String>,
    /// The configuration file location.
    pub config_toml_path: String,
}

impl Info {
    /// Builds the loading info from the process environment and an optional
    /// config file path.
    #[must_use]
    pub fn from_env(config_toml_path: String) -> Self {
        Self {
            config_toml: std::env::var(ENV_VAR_CONFIG_TOML).ok(),
            config_toml_path,
        }
    }
}

/// Errors that can occur when loading the configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unable to load the configuration: {source}")]
    UnableToLoad {
        #[from]
        source: figment::Error,
    },

    #[error("unable to write the configuration to {path}: {source}")]
    UnableToWrite { path: String, source: std::io::Error },
}

/// The log threshold for the services.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum Threshold {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// The `[logging]` section.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
pub struct Logging {
    /// Logging threshold for all services.
    #[serde(default)]
    pub threshold: Threshold,
}

/// The root configuration for all the transfer-bench services.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
pub struct Configuration {
    /// Logging configuration.
    #[serde(default)]
    pub logging: Logging,

    /// The `BitTorrent` tracker configuration.
    #[serde(default)]
    pub tracker: Tracker,

    /// The HTTP file server configuration.
    #[serde(default)]
    pub file_server: FileServer,

    /// The benchmark runner configuration.
    #[serde(default)]
    pub benchmark: Benchmark,
}

impl Configuration {
    /// Loads the configuration from the configuration file.
    ///
    /// # Errors
    ///
    /// Will return an error if `path` does not exist or has a bad configuration.
    pub fn load_from_file(path: &str) -> Result<Configuration, Error> {
        let figment = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(CONFIG_OVERRIDE_PREFIX).split("__"));

        Ok(figment.extract()?)
    }

    /// Loads the configuration from the [`Info`] struct. When the whole
    /// configuration was injected via the env var it takes priority over the
    /// file.
    ///
    /// # Errors
    ///
    /// Will return an error if the configuration cannot be parsed.
    pub fn load(info: &Info) -> Result<Configuration, Error> {
        let figment = match &info.config_toml {
            Some(config_toml) => Figment::new().merge(Toml::string(config_toml)),
            None => Figment::new().merge(Toml::file(&info.config_toml_path)),
        }
        .merge(Env::prefixed(CONFIG_OVERRIDE_PREFIX).split("__"));

        Ok(figment.extract()?)
    }

    /// Saves the configuration to the configuration file.
    ///
    /// # Errors
    ///
    /// Will return an error if the file cannot be written.
    pub fn save_to_file(&self, path: &str) -> Result<(), Error> {
        fs::write(path, self.to_toml()).map_err(|source| Error::UnableToWrite {
            path: path.to_owned(),
            source,
        })
    }

    /// Encodes the configuration to TOML.
    ///
    /// # Panics
    ///
    /// Will panic if the configuration cannot be encoded (all sections are
    /// plain serde structs, so it never should).
    #[must_use]
    pub fn to_toml(&self) -> String {
        toml::to_string(self).expect("Could not encode TOML value")
    }
}
