//! File server routes.
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use hyper::Request;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::{Level, Span};

use super::handlers::{get_file, list_files, upload_file};
use super::FileStore;

/// The benchmark uploads files up to 10 MB; leave headroom for the
/// multipart framing.
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// It adds the routes to the router.
#[allow(clippy::needless_pass_by_value)]
pub fn router(store: Arc<FileStore>, &addr: &SocketAddr) -> Router {
    Router::new()
        .route("/files/:filename", get(get_file).with_state(store.clone()))
        .route("/upload/:filename", post(upload_file).with_state(store.clone()))
        .route("/list", get(list_files).with_state(store))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(move |request: &Request<axum::body::Body>, _span: &Span| {
                    let method = request.method().to_string();
                    let uri = request.uri().to_string();

                    tracing::span!(
                        target: "FILE SERVER",
                        tracing::Level::INFO, "request", server_socket_addr = %addr, method = %method, uri = %uri);
                })
                .on_response(move |response: &Response, latency: Duration, _span: &Span| {
                    let status_code = response.status();
                    let latency_ms = latency.as_millis();

                    tracing::span!(
                        target: "FILE SERVER",
                        tracing::Level::INFO, "response", server_socket_addr = %addr, latency = %latency_ms, status = %status_code);
                }),
        )
}
