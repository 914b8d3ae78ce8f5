//! `Announce` request for the HTTP announce service.
//!
//! Data structures and logic for parsing the `announce` request.
//!
//! Parsing is permissive, as tracker protocols traditionally are: absent or
//! malformed parameters default to zero/empty values instead of failing the
//! request. The `info_hash` and `peer_id` params are special because they
//! contain percent encoded binary data; both decode lossily into 20-byte
//! arrays.
use transfer_bench_primitives::announce_event::AnnounceEvent;
use transfer_bench_primitives::info_hash::InfoHash;
use transfer_bench_primitives::peer;

use crate::servers::http::percent_encoding::{percent_decode_info_hash, percent_decode_peer_id};
use crate::servers::http::v1::query::Query;

/// The default port a peer listens on when the announce request does not
/// carry one.
pub const DEFAULT_PEER_PORT: u16 = 6881;

// Query param names
const INFO_HASH: &str = "info_hash";
const PEER_ID: &str = "peer_id";
const PORT: &str = "port";
const DOWNLOADED: &str = "downloaded";
const UPLOADED: &str = "uploaded";
const LEFT: &str = "left";
const EVENT: &str = "event";

/// The `Announce` request. Fields use the domain types after parsing the
/// query params of the request.
///
/// ```rust
/// use transfer_bench::servers::http::v1::requests::announce::Announce;
/// use transfer_bench_primitives::announce_event::AnnounceEvent;
/// use transfer_bench_primitives::info_hash::InfoHash;
/// use transfer_bench_primitives::peer;
///
/// let request = Announce {
///     info_hash: "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse::<InfoHash>().unwrap(),
///     peer_id: peer::Id(*b"-qB00000000000000001"),
///     port: 17548,
///     downloaded: 1,
///     uploaded: 2,
///     left: 3,
///     event: AnnounceEvent::Started,
/// };
/// ```
///
/// > **NOTICE**: the struct does not contain the `IP` of the peer. It's not
/// used by the tracker; the peer IP is resolved from the request itself.
#[derive(Debug, PartialEq, Eq)]
pub struct Announce {
    /// The `InfoHash` of the torrent.
    pub info_hash: InfoHash,
    /// The `peer::Id` of the peer.
    pub peer_id: peer::Id,
    /// The port the peer is listening on.
    pub port: u16,
    /// The number of bytes downloaded by the peer.
    pub downloaded: i64,
    /// The number of bytes uploaded by the peer.
    pub uploaded: i64,
    /// The number of bytes the peer still has to download.
    pub left: i64,
    /// The event the peer is reporting: `started`, `stopped`, `completed`
    /// or none.
    pub event: AnnounceEvent,
}

impl From<Query> for Announce {
    fn from(query: Query) -> Self {
        let info_hash = percent_decode_info_hash(&query.get_param(INFO_HASH).unwrap_or_default());
        let peer_id = percent_decode_peer_id(&query.get_param(PEER_ID).unwrap_or_default());

        let port = query
            .get_param(PORT)
            .and_then(|raw| raw.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PEER_PORT);

        let event = AnnounceEvent::from_query_param(&query.get_param(EVENT).unwrap_or_default());

        Self {
            info_hash,
            peer_id,
            port,
            downloaded: number_of_bytes_param(&query, DOWNLOADED),
            uploaded: number_of_bytes_param(&query, UPLOADED),
            left: number_of_bytes_param(&query, LEFT),
            event,
        }
    }
}

fn number_of_bytes_param(query: &Query, param_name: &str) -> i64 {
    query
        .get_param(param_name)
        .and_then(|raw| raw.parse::<i64>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    mod announce_request {
        use std::str::FromStr;

        use transfer_bench_primitives::announce_event::AnnounceEvent;
        use transfer_bench_primitives::info_hash::InfoHash;
        use transfer_bench_primitives::peer;

        use crate::servers::http::v1::query::Query;
        use crate::servers::http::v1::requests::announce::{Announce, DEFAULT_PEER_PORT};

        fn parse(raw_query: &str) -> Announce {
            raw_query.parse::<Query>().unwrap().into()
        }

        #[test]
        fn should_be_parsed_from_a_full_url_query() {
            let announce = parse(
                "info_hash=%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0\
                 &peer_id=-qB00000000000000001\
                 &port=17548&downloaded=1&uploaded=2&left=3&event=started",
            );

            assert_eq!(
                announce,
                Announce {
                    info_hash: InfoHash::from_str("3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0").unwrap(),
                    peer_id: peer::Id(*b"-qB00000000000000001"),
                    port: 17548,
                    downloaded: 1,
                    uploaded: 2,
                    left: 3,
                    event: AnnounceEvent::Started,
                }
            );
        }

        #[test]
        fn should_default_the_optional_params_when_they_are_missing() {
            let announce = parse("info_hash=%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0");

            assert_eq!(announce.port, DEFAULT_PEER_PORT);
            assert_eq!(announce.downloaded, 0);
            assert_eq!(announce.uploaded, 0);
            assert_eq!(announce.left, 0);
            assert_eq!(announce.event, AnnounceEvent::None);
        }

        #[test]
        fn should_default_unparsable_numbers_to_zero_instead_of_failing() {
            let announce = parse(
                "info_hash=%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0\
                 &port=not-a-number&left=not-a-number",
            );

            assert_eq!(announce.port, DEFAULT_PEER_PORT);
            assert_eq!(announce.left, 0);
        }

        #[test]
        fn should_accept_a_missing_info_hash_as_a_zeroed_identifier() {
            let announce = parse("peer_id=-qB00000000000000001");

            assert_eq!(announce.info_hash, InfoHash::from([0u8; 20]));
        }
    }
}
