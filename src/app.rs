//! The transfer-bench server application.
//!
//! It's basically a container for the long-running services the benchmark
//! clients talk to:
//!
//! - The `BitTorrent` announce service (the tracker).
//! - The HTTP file server for the HTTP/1.1 and HTTP/2 benchmarks.
//!
//! Both are always started; the benchmark clients run as separate
//! processes.
use std::sync::Arc;

use tokio::task::JoinHandle;
use transfer_bench_configuration::Configuration;

use crate::bootstrap::jobs::{file_server, http_tracker};
use crate::core;

/// Starts the services and returns their join handles.
pub async fn start(config: &Configuration, tracker: Arc<core::Tracker>) -> Vec<JoinHandle<()>> {
    let mut jobs: Vec<JoinHandle<()>> = Vec::new();

    jobs.push(http_tracker::start_job(&config.tracker, tracker).await);

    jobs.push(file_server::start_job(&config.file_server).await);

    jobs
}
