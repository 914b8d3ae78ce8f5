//! Axum extractors for the announce handlers.
pub mod announce_request;
pub mod client_ip_sources;
