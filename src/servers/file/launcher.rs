//! Logic to start new file server instances.
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use tokio::task::JoinHandle;
use tracing::info;

use super::routes::router;
use super::FileStore;

/// It starts the file server on the given address with graceful shutdown,
/// returning the bound address (useful when binding to port `0`) and the
/// server task handle.
///
/// # Errors
///
/// Will return an error if the TCP listener cannot be bound.
///
/// # Panics
///
/// The spawned task will panic if the Axum server crashes.
pub async fn start_with_graceful_shutdown<F>(
    bind_to: SocketAddr,
    store: Arc<FileStore>,
    shutdown_signal: F,
) -> std::io::Result<(SocketAddr, JoinHandle<()>)>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(bind_to).await?;
    let bound_addr = listener.local_addr()?;

    let app = router(store, &bound_addr);

    info!(target: "FILE SERVER", "listening on http://{bound_addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal)
            .await
            .expect("the file server should not fail");
    });

    Ok((bound_addr, handle))
}

/// It starts the file server with TLS, which lets clients negotiate HTTP/2
/// via ALPN.
///
/// # Errors
///
/// Will return an error if the TCP listener cannot be bound or the
/// certificate cannot be read.
///
/// # Panics
///
/// The spawned task will panic if the Axum server crashes.
pub async fn start_tls(
    bind_to: SocketAddr,
    (ssl_cert_path, ssl_key_path): (String, String),
    store: Arc<FileStore>,
) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = std::net::TcpListener::bind(bind_to)?;
    let bound_addr = listener.local_addr()?;

    let app = router(store, &bound_addr);

    let tls_config = RustlsConfig::from_pem_file(ssl_cert_path, ssl_key_path).await?;

    info!(target: "FILE SERVER", "listening on https://{bound_addr}");

    let handle = tokio::spawn(async move {
        axum_server::from_tcp_rustls(listener, tls_config)
            .serve(app.into_make_service())
            .await
            .expect("the file server should not fail");
    });

    Ok((bound_addr, handle))
}
