//! This module contains functions for percent decoding infohashes and peer ids.
//!
//! `BitTorrent` infohashes and peer ids are percent encoded like any other
//! URL parameter. But they are encoded from binary data (byte arrays) which
//! may not be valid UTF-8, so they cannot be treated as regular strings
//! after decoding.
//!
//! Decoding is lossy on purpose: announce parameters that do not contain
//! exactly 20 bytes are zero-padded or truncated instead of rejected,
//! following the traditionally permissive posture of tracker protocols.
//!
//! More information about "Percent Encoding":
//!
//! - <https://datatracker.ietf.org/doc/html/rfc3986#section-2.1>
//! - <https://en.wikipedia.org/wiki/URL_encoding>
use transfer_bench_primitives::info_hash::InfoHash;
use transfer_bench_primitives::peer;

/// Percent decodes a percent encoded infohash. Internally an [`InfoHash`] is
/// a 20-byte array.
///
/// For example, given the infohash `3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0`,
/// its percent encoded representation is
/// `%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0`.
///
/// ```rust
/// use std::str::FromStr;
/// use transfer_bench::servers::http::percent_encoding::percent_decode_info_hash;
/// use transfer_bench_primitives::info_hash::InfoHash;
///
/// let encoded_infohash = "%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0";
///
/// let info_hash = percent_decode_info_hash(encoded_infohash);
///
/// assert_eq!(
///     info_hash,
///     InfoHash::from_str("3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0").unwrap()
/// );
/// ```
#[must_use]
pub fn percent_decode_info_hash(raw_info_hash: &str) -> InfoHash {
    let bytes = percent_encoding::percent_decode_str(raw_info_hash).collect::<Vec<u8>>();
    InfoHash::from_bytes_lossy(&bytes)
}

/// Percent decodes a percent encoded peer id. Internally a peer
/// [`Id`](peer::Id) is a 20-byte array.
///
/// For example, given the peer id `*b"-qB00000000000000000"`,
/// its percent encoded representation is `%2DqB00000000000000000`.
///
/// ```rust
/// use transfer_bench::servers::http::percent_encoding::percent_decode_peer_id;
/// use transfer_bench_primitives::peer;
///
/// let encoded_peer_id = "%2DqB00000000000000000";
///
/// let peer_id = percent_decode_peer_id(encoded_peer_id);
///
/// assert_eq!(peer_id, peer::Id(*b"-qB00000000000000000"));
/// ```
#[must_use]
pub fn percent_decode_peer_id(raw_peer_id: &str) -> peer::Id {
    let bytes = percent_encoding::percent_decode_str(raw_peer_id).collect::<Vec<u8>>();
    peer::Id::from_bytes_lossy(&bytes)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use transfer_bench_primitives::info_hash::InfoHash;
    use transfer_bench_primitives::peer;

    use crate::servers::http::percent_encoding::{percent_decode_info_hash, percent_decode_peer_id};

    #[test]
    fn it_should_decode_a_percent_encoded_info_hash() {
        let encoded_infohash = "%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0";

        let info_hash = percent_decode_info_hash(encoded_infohash);

        assert_eq!(
            info_hash,
            InfoHash::from_str("3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0").unwrap()
        );
    }

    #[test]
    fn it_should_zero_pad_a_short_info_hash_instead_of_failing() {
        let info_hash = percent_decode_info_hash("%3B%24");

        let mut expected = [0u8; 20];
        expected[..2].clone_from_slice(&[0x3b, 0x24]);

        assert_eq!(info_hash, InfoHash::from(expected));
    }

    #[test]
    fn it_should_decode_a_percent_encoded_peer_id() {
        let encoded_peer_id = "%2DqB00000000000000000";

        let peer_id = percent_decode_peer_id(encoded_peer_id);

        assert_eq!(peer_id, peer::Id(*b"-qB00000000000000000"));
    }
}
