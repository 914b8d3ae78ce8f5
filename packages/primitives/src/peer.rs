//! Peer struct used by the core tracker.
//!
//! A sample peer:
//!
//! ```rust,no_run
//! use std::net::{IpAddr, Ipv4Addr, SocketAddr};
//! use transfer_bench_primitives::announce_event::AnnounceEvent;
//! use transfer_bench_primitives::{peer, DurationSinceUnixEpoch, NumberOfBytes};
//!
//! peer::Peer {
//!     peer_id: peer::Id(*b"-qB00000000000000000"),
//!     peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 8080),
//!     updated: DurationSinceUnixEpoch::new(1_669_397_478_934, 0),
//!     uploaded: NumberOfBytes::new(0),
//!     downloaded: NumberOfBytes::new(0),
//!     left: NumberOfBytes::new(0),
//!     event: AnnounceEvent::Started,
//! };
//! ```
use std::net::{IpAddr, SocketAddr};

use crate::announce_event::AnnounceEvent;
use crate::{DurationSinceUnixEpoch, NumberOfBytes};

/// A peer participating in a swarm.
///
/// Peers are keyed within a swarm by their socket address `(ip, port)`: a
/// new announce from the same address replaces the previous record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peer {
    /// ID used by the downloader peer
    pub peer_id: Id,
    /// The IP and port this peer is listening on
    pub peer_addr: SocketAddr,
    /// The last time the tracker received an announce request from this peer (timestamp)
    pub updated: DurationSinceUnixEpoch,
    /// The total amount of bytes uploaded by this peer so far
    pub uploaded: NumberOfBytes,
    /// The total amount of bytes downloaded by this peer so far
    pub downloaded: NumberOfBytes,
    /// The number of bytes this peer still has to download
    pub left: NumberOfBytes,
    /// This is an optional key which maps to started, completed, or stopped (or empty, which is the same as not being present).
    pub event: AnnounceEvent,
}

impl Peer {
    /// A seeder is a peer with nothing left to download.
    #[must_use]
    pub fn is_seeder(&self) -> bool {
        self.left.0 <= 0
    }

    #[must_use]
    pub fn ip(&self) -> IpAddr {
        self.peer_addr.ip()
    }

    pub fn change_ip(&mut self, new_ip: &IpAddr) {
        self.peer_addr = SocketAddr::new(*new_ip, self.peer_addr.port());
    }
}

pub const PEER_ID_BYTES_LEN: usize = 20;

/// The 20-byte peer id reported in the announce request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Id(pub [u8; PEER_ID_BYTES_LEN]);

impl From<[u8; PEER_ID_BYTES_LEN]> for Id {
    fn from(bytes: [u8; PEER_ID_BYTES_LEN]) -> Self {
        Self(bytes)
    }
}

impl Id {
    /// Builds an `Id` from arbitrary announce bytes, padding with zeros or
    /// truncating to 20 bytes. Trackers traditionally accept whatever the
    /// client sent instead of failing the announce.
    #[must_use]
    pub fn from_bytes_lossy(bytes: &[u8]) -> Self {
        let mut id = Self::default();
        let len = bytes.len().min(PEER_ID_BYTES_LEN);
        id.0[..len].clone_from_slice(&bytes[..len]);
        id
    }

    /// Converts to hex string.
    ///
    /// For the `Id` `-qB00000000000000000` it returns `2d71423030303030303030303030303030303030`
    ///
    /// Return `None` if the id cannot be hexlified.
    #[must_use]
    pub fn to_hex_string(&self) -> Option<String> {
        let mut tmp = [0u8; PEER_ID_BYTES_LEN * 2];

        binascii::bin2hex(&self.0, &mut tmp).ok()?;

        std::str::from_utf8(&tmp).ok().map(|hex| format!("0x{hex}"))
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_hex_string() {
            Some(hex) => write!(f, "{hex}"),
            None => write!(f, ""),
        }
    }
}

pub mod fixture {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use super::{Id, Peer};
    use crate::announce_event::AnnounceEvent;
    use crate::{DurationSinceUnixEpoch, NumberOfBytes};

    #[derive(PartialEq, Eq, Debug)]
    pub struct PeerBuilder {
        peer: Peer,
    }

    #[allow(clippy::derivable_impls)]
    impl Default for PeerBuilder {
        fn default() -> Self {
            Self { peer: Peer::default() }
        }
    }

    impl PeerBuilder {
        #[must_use]
        pub fn seeder() -> Self {
            Self::default()
                .with_peer_id(&Id(*b"-qB00000000000000001"))
                .with_no_bytes_pending_to_download()
        }

        #[must_use]
        pub fn leecher() -> Self {
            Self::default()
                .with_peer_id(&Id(*b"-qB00000000000000002"))
                .with_bytes_pending_to_download(10)
        }

        #[must_use]
        pub fn with_peer_id(mut self, peer_id: &Id) -> Self {
            self.peer.peer_id = *peer_id;
            self
        }

        #[must_use]
        pub fn with_peer_addr(mut self, peer_addr: &SocketAddr) -> Self {
            self.peer.peer_addr = *peer_addr;
            self
        }

        #[must_use]
        pub fn with_event(mut self, event: AnnounceEvent) -> Self {
            self.peer.event = event;
            self
        }

        #[must_use]
        pub fn with_bytes_pending_to_download(mut self, left: i64) -> Self {
            self.peer.left = NumberOfBytes::new(left);
            self
        }

        #[must_use]
        pub fn with_no_bytes_pending_to_download(mut self) -> Self {
            self.peer.left = NumberOfBytes::new(0);
            self
        }

        #[must_use]
        pub fn last_updated_on(mut self, updated: DurationSinceUnixEpoch) -> Self {
            self.peer.updated = updated;
            self
        }

        #[must_use]
        pub fn build(self) -> Peer {
            self.peer
        }
    }

    impl Default for Peer {
        fn default() -> Self {
            Self {
                peer_id: Id(*b"-qB00000000000000000"),
                peer_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080),
                updated: DurationSinceUnixEpoch::new(1_669_397_478_934, 0),
                uploaded: NumberOfBytes::new(0),
                downloaded: NumberOfBytes::new(0),
                left: NumberOfBytes::new(0),
                event: AnnounceEvent::Started,
            }
        }
    }
}

#[cfg(test)]
pub mod test {
    mod torrent_peer_id {
        use crate::peer;

        #[test]
        fn should_be_converted_to_hex_string() {
            let id = peer::Id(*b"-qB00000000000000000");
            assert_eq!(id.to_hex_string().unwrap(), "0x2d71423030303030303030303030303030303030");

            let id = peer::Id([
                0, 159, 146, 150, 0, 159, 146, 150, 0, 159, 146, 150, 0, 159, 146, 150, 0, 159, 146, 150,
            ]);
            assert_eq!(id.to_hex_string().unwrap(), "0x009f9296009f9296009f9296009f9296009f9296");
        }

        #[test]
        fn should_be_padded_when_built_from_fewer_than_20_bytes() {
            let id = peer::Id::from_bytes_lossy(b"-qB0");

            let mut expected = [0u8; 20];
            expected[..4].clone_from_slice(b"-qB0");

            assert_eq!(id.0, expected);
        }

        #[test]
        fn should_be_truncated_when_built_from_more_than_20_bytes() {
            let id = peer::Id::from_bytes_lossy(b"-qB00000000000000000-extra");
            assert_eq!(id.0, *b"-qB00000000000000000");
        }
    }

    mod torrent_peer {
        use crate::peer::fixture::PeerBuilder;

        #[test]
        fn a_peer_with_no_bytes_left_is_a_seeder() {
            assert!(PeerBuilder::seeder().build().is_seeder());
        }

        #[test]
        fn a_peer_with_bytes_left_is_a_leecher() {
            assert!(!PeerBuilder::leecher().build().is_seeder());
        }
    }
}
