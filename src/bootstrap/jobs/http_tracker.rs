//! Announce service job starter.
//!
//! The function [`start_job`] starts the HTTP announce service and returns
//! the join handle for its server task.
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::core::Tracker;
use crate::servers::http::v1::launcher;
use crate::servers::signals::global_shutdown_signal;

/// It starts the announce service with the provided configuration.
///
/// # Panics
///
/// It would panic if the bind address is invalid or the listener cannot be
/// bound.
pub async fn start_job(config: &transfer_bench_configuration::Tracker, tracker: Arc<Tracker>) -> JoinHandle<()> {
    let bind_to = config
        .bind_address
        .parse::<std::net::SocketAddr>()
        .expect("it should have a valid tracker bind address");

    let (_addr, handle) = launcher::start_with_graceful_shutdown(bind_to, tracker, global_shutdown_signal())
        .await
        .expect("it should be able to start the announce service");

    handle
}

#[cfg(test)]
mod tests {
    use transfer_bench_test_helpers::configuration::ephemeral;

    use crate::bootstrap::app::initialize_with_configuration;
    use crate::bootstrap::jobs::http_tracker::start_job;

    #[tokio::test]
    async fn it_should_start_the_announce_service() {
        let cfg = ephemeral();
        let tracker = initialize_with_configuration(&cfg);

        let job = start_job(&cfg.tracker, tracker).await;

        job.abort();
    }
}
