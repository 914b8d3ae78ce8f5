//! Logic to start new announce service instances.
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use super::routes::router;
use crate::core::Tracker;

/// It starts the announce service on the given address with graceful
/// shutdown, returning the bound address (useful when binding to port `0`)
/// and the server task handle.
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
    tracker: Arc<Tracker>,
    shutdown_signal: F,
) -> std::io::Result<(SocketAddr, JoinHandle<()>)>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(bind_to).await?;
    let bound_addr = listener.local_addr()?;

    let app = router(tracker, &bound_addr);

    info!(target: "ANNOUNCE SERVICE", "listening on http://{bound_addr}/announce");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown_signal)
            .await
            .expect("the announce service should not fail");
    });

    Ok((bound_addr, handle))
}
