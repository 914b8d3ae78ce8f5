//! File server job starter.
//!
//! The function [`start_job`] starts the HTTP file server and returns the
//! join handle for its server task.
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::warn;
use transfer_bench_configuration::FileServer;

use crate::servers::file::{launcher, FileStore};
use crate::servers::signals::global_shutdown_signal;

/// It starts the file server with the provided configuration.
///
/// # Panics
///
/// It would panic if the bind address is invalid, the working directories
/// cannot be created or the listener cannot be bound.
pub async fn start_job(config: &FileServer) -> JoinHandle<()> {
    let bind_to = config
        .bind_address
        .parse::<std::net::SocketAddr>()
        .expect("it should have a valid file server bind address");

    for dir in [&config.files_dir, &config.uploads_dir] {
        std::fs::create_dir_all(dir).expect("it should be able to create the file server directories");
    }

    let store = Arc::new(FileStore::new(&config.files_dir, &config.uploads_dir));

    if config.ssl_enabled {
        if let (Some(ssl_cert_path), Some(ssl_key_path)) = (&config.ssl_cert_path, &config.ssl_key_path) {
            let (_addr, handle) = launcher::start_tls(bind_to, (ssl_cert_path.clone(), ssl_key_path.clone()), store)
                .await
                .expect("it should be able to start the file server with tls");

            return handle;
        }

        warn!("tls is enabled but no certificate was configured, serving plaintext");
    }

    let (_addr, handle) = launcher::start_with_graceful_shutdown(bind_to, store, global_shutdown_signal())
        .await
        .expect("it should be able to start the file server");

    handle
}

#[cfg(test)]
mod tests {
    use transfer_bench_test_helpers::configuration::ephemeral;

    use crate::bootstrap::jobs::file_server::start_job;

    #[tokio::test]
    async fn it_should_start_the_file_server() {
        let cfg = ephemeral();

        let job = start_job(&cfg.file_server).await;

        job.abort();
    }
}
