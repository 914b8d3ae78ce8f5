//! Primitive types shared by the transfer-bench packages.
//!
//! These are the basic data structures of the `BitTorrent` half of the
//! benchmark suite: torrent identifiers, swarm peers and swarm statistics.
//! They are used by the tracker server crate as well as by the benchmark
//! clients.
use std::time::Duration;

pub mod announce_event;
pub mod info_hash;
pub mod peer;
pub mod swarm_metadata;
pub mod torrent_metrics;

/// Duration since the Unix Epoch.
pub type DurationSinceUnixEpoch = Duration;

/// Number of bytes reported in an announce request (`uploaded`, `downloaded`
/// or `left`). Signed because the wire protocol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize)]
pub struct NumberOfBytes(pub i64);

impl NumberOfBytes {
    #[must_use]
    pub fn new(bytes: i64) -> Self {
        Self(bytes)
    }
}
