//! Axum [`handlers`](axum#handlers) for the `announce` requests.
//!
//! The handler resolves the client IP address, builds the domain peer from
//! the request and delegates to the core tracker. Refer to
//! [`requests::announce`](crate::servers::http::v1::requests::announce) for
//! the request parsing rules.
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use tracing::debug;
use transfer_bench_clock::clock::Time;
use transfer_bench_primitives::{peer, NumberOfBytes};

use crate::core::Tracker;
use crate::servers::http::v1::extractors::announce_request::ExtractRequest;
use crate::servers::http::v1::extractors::client_ip_sources::Extract as ExtractClientIpSources;
use crate::servers::http::v1::requests::announce::Announce;
use crate::servers::http::v1::responses;
use crate::servers::http::v1::services::peer_ip_resolver::{self, ClientIpSources};
use crate::CurrentClock;

/// It handles the `announce` request.
#[allow(clippy::unused_async)]
pub async fn handle(
    State(tracker): State<Arc<Tracker>>,
    ExtractRequest(announce_request): ExtractRequest,
    ExtractClientIpSources(client_ip_sources): ExtractClientIpSources,
) -> Response {
    debug!("http announce request: {:#?}", announce_request);

    handle_announce(&tracker, &announce_request, &client_ip_sources)
}

fn handle_announce(tracker: &Arc<Tracker>, announce_request: &Announce, client_ip_sources: &ClientIpSources) -> Response {
    let peer_ip = match peer_ip_resolver::invoke(tracker.is_behind_reverse_proxy(), client_ip_sources) {
        Ok(peer_ip) => peer_ip,
        Err(error) => {
            return responses::error::Error {
                failure_reason: error.to_string(),
            }
            .into_response()
        }
    };

    let peer = peer_from_request(announce_request, &peer_ip);

    let announce_data = tracker.announce(&announce_request.info_hash, &peer);

    let response: responses::Announce = announce_data.into();
    response.into_response()
}

/// It builds a `Peer` from the announce request.
///
/// It ignores the peer address in the announce request params: the peer key
/// is formed from the resolved source IP and the announced port.
#[must_use]
fn peer_from_request(announce_request: &Announce, peer_ip: &IpAddr) -> peer::Peer {
    peer::Peer {
        peer_id: announce_request.peer_id,
        peer_addr: SocketAddr::new(*peer_ip, announce_request.port),
        updated: CurrentClock::now(),
        uploaded: NumberOfBytes::new(announce_request.uploaded),
        downloaded: NumberOfBytes::new(announce_request.downloaded),
        left: NumberOfBytes::new(announce_request.left),
        event: announce_request.event,
    }
}
