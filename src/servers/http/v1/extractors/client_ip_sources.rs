//! Axum [`extractor`](axum::extract) to get the relevant information to
//! resolve the remote client IP.
//!
//! It's a wrapper for two third-party Axum extractors: the
//! `RightmostXForwardedFor` extractor from the `axum-client-ip` crate and
//! the `ConnectInfo` extractor from the `axum` crate. Which source wins is
//! decided later by the
//! [`peer_ip_resolver`](crate::servers::http::v1::services::peer_ip_resolver)
//! service, depending on whether the tracker runs behind a reverse proxy.
use std::net::SocketAddr;

use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::response::Response;
use axum_client_ip::RightmostXForwardedFor;

use crate::servers::http::v1::services::peer_ip_resolver::ClientIpSources;

/// Extractor for the [`ClientIpSources`] struct.
pub struct Extract(pub ClientIpSources);

#[async_trait]
impl<S> FromRequestParts<S> for Extract
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let right_most_x_forwarded_for = match RightmostXForwardedFor::from_request_parts(parts, state).await {
            Ok(right_most_x_forwarded_for) => Some(right_most_x_forwarded_for.0),
            Err(_) => None,
        };

        let connection_info_ip = match ConnectInfo::<SocketAddr>::from_request_parts(parts, state).await {
            Ok(connection_info_socket_addr) => Some(connection_info_socket_addr.0.ip()),
            Err(_) => None,
        };

        Ok(Extract(ClientIpSources {
            right_most_x_forwarded_for,
            connection_info_ip,
        }))
    }
}
