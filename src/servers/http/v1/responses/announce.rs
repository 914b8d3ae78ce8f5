//! `Announce` response for the HTTP announce service.
//!
//! The response is the compact form described in
//! [BEP 23: Tracker Returns Compact Peer Lists](https://www.bittorrent.org/beps/bep_0023.html):
//!
//! _"To reduce the size of tracker responses and to reduce memory and
//! computational requirements in trackers, trackers may return peers as a
//! packed string rather than as a bencoded list."_
//!
//! The `peers` value is the concatenation, for every included peer, of its
//! 4-byte big-endian IPv4 address followed by its 2-byte big-endian port.
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::AnnounceData;

/// Number of bytes per peer in the compact `peers` blob.
pub const COMPACT_PEER_BYTES_LEN: usize = 6;

/// The compact `announce` response.
///
/// Fields are declared in bencoded key order (`complete` < `incomplete` <
/// `interval` < `min interval` < `peers`), so serializing the struct yields
/// a canonical bencoded dictionary.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Announce {
    pub complete: i64,
    pub incomplete: i64,
    pub interval: i64,
    #[serde(rename = "min interval")]
    pub min_interval: i64,
    #[serde(with = "serde_bytes")]
    pub peers: Vec<u8>,
}

impl From<AnnounceData> for Announce {
    fn from(data: AnnounceData) -> Self {
        Self {
            complete: i64::from(data.stats.complete),
            incomplete: i64::from(data.stats.incomplete),
            interval: i64::from(data.policy.interval),
            min_interval: i64::from(data.policy.interval_min),
            peers: compact_peer_list(&data),
        }
    }
}

impl Announce {
    /// The bencoded response body.
    ///
    /// # Errors
    ///
    /// Will return an error if the response cannot be bencoded.
    pub fn body(&self) -> Result<Vec<u8>, serde_bencode::Error> {
        serde_bencode::to_bytes(self)
    }

    /// Decodes the compact `peers` blob back into socket addresses.
    /// Trailing bytes that do not complete a 6-byte chunk are ignored.
    #[must_use]
    pub fn peer_addrs(&self) -> Vec<SocketAddr> {
        self.peers
            .chunks_exact(COMPACT_PEER_BYTES_LEN)
            .map(|chunk| {
                let ip = Ipv4Addr::new(chunk[0], chunk[1], chunk[2], chunk[3]);
                let port = u16::from_be_bytes([chunk[4], chunk[5]]);
                SocketAddr::new(IpAddr::V4(ip), port)
            })
            .collect()
    }
}

impl IntoResponse for Announce {
    fn into_response(self) -> Response {
        match self.body() {
            Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], body).into_response(),
            Err(err) => super::error::Error {
                failure_reason: format!("failed to encode the announce response: {err}"),
            }
            .into_response(),
        }
    }
}

/// Encodes the peer list in the compact format. Peers whose address is not
/// IPv4 cannot be represented and are skipped; that single peer is dropped
/// from the response and the request still succeeds.
fn compact_peer_list(data: &AnnounceData) -> Vec<u8> {
    let mut bytes: Vec<u8> = Vec::with_capacity(data.peers.len() * COMPACT_PEER_BYTES_LEN);

    for peer in &data.peers {
        match peer.peer_addr.ip() {
            IpAddr::V4(ip) => {
                bytes.extend_from_slice(&u32::from(ip).to_be_bytes());
                bytes.extend_from_slice(&peer.peer_addr.port().to_be_bytes());
            }
            IpAddr::V6(ip) => {
                debug!("skipping peer [{ip}]:{} in compact response", peer.peer_addr.port());
            }
        }
    }

    bytes
}
