use std::env;

use transfer_bench_configuration::{Configuration, Threshold};

use crate::random;

/// This configuration is used for testing. It binds the services to
/// ephemeral ports and uses random temp directories so concurrent tests do
/// not collide.
///
/// # Panics
///
/// Will panic if it can't convert a temp dir path to string.
#[must_use]
pub fn ephemeral() -> Configuration {
    let mut config = Configuration::default();

    config.logging.threshold = Threshold::Off; // Change to `Debug` for tests debugging

    // Ephemeral socket addresses
    config.tracker.bind_address = "127.0.0.1:0".to_owned();
    config.file_server.bind_address = "127.0.0.1:0".to_owned();

    // Random temp dirs for the benchmark artifacts
    let temp_directory = env::temp_dir().join(format!("transfer_bench_{}", random::string(16)));
    config.benchmark.results_dir = temp_directory.join("results").to_str().unwrap().to_owned();
    config.benchmark.files_dir = temp_directory.join("files").to_str().unwrap().to_owned();
    config.benchmark.downloads_dir = temp_directory.join("downloads").to_str().unwrap().to_owned();
    config.benchmark.torrents_dir = temp_directory.join("torrents").to_str().unwrap().to_owned();
    config.file_server.files_dir = temp_directory.join("files").to_str().unwrap().to_owned();
    config.file_server.uploads_dir = temp_directory.join("uploads").to_str().unwrap().to_owned();

    config
}
