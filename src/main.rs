use tracing::info;
use transfer_bench::{app, bootstrap};

#[tokio::main]
async fn main() {
    let config = bootstrap::app::config();

    let tracker = bootstrap::app::initialize_with_configuration(&config);

    let jobs = app::start(&config, tracker).await;

    // handle the signals
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("transfer-bench shutting down..");

            // Await for all jobs to shutdown
            futures::future::join_all(jobs).await;
            info!("transfer-bench successfully shutdown.");
        }
    }
}
