use derive_more::Constructor;
use serde::{Deserialize, Serialize};

/// The `[tracker]` section: configuration for the announce service.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Tracker {
    /// The address the tracker will bind to.
    /// The format is `ip:port`, for example `0.0.0.0:6969`. If you want the
    /// OS to choose a random port, use port `0`.
    #[serde(default = "Tracker::default_bind_address")]
    pub bind_address: String,

    /// Weather the tracker is behind a reverse proxy. When `true` the peer
    /// IP is taken from the right-most `X-Forwarded-For` header entry
    /// instead of the connection info.
    #[serde(default = "Tracker::default_on_reverse_proxy")]
    pub on_reverse_proxy: bool,

    /// Announce policy configuration.
    #[serde(default = "Tracker::default_announce_policy")]
    pub announce_policy: AnnouncePolicy,

    /// Peer expiry policy configuration.
    #[serde(default = "Tracker::default_policy")]
    pub policy: TrackerPolicy,
}

impl Default for Tracker {
    fn default() -> Self {
        Self {
            bind_address: Self::default_bind_address(),
            on_reverse_proxy: Self::default_on_reverse_proxy(),
            announce_policy: Self::default_announce_policy(),
            policy: Self::default_policy(),
        }
    }
}

impl Tracker {
    fn default_bind_address() -> String {
        "0.0.0.0:6969".to_owned()
    }

    fn default_on_reverse_proxy() -> bool {
        false
    }

    fn default_announce_policy() -> AnnouncePolicy {
        AnnouncePolicy::default()
    }

    fn default_policy() -> TrackerPolicy {
        TrackerPolicy::default()
    }
}

/// The announce intervals returned to the peers.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Constructor)]
pub struct AnnouncePolicy {
    /// Interval in seconds that the client should wait between sending
    /// regular announce requests to the tracker.
    ///
    /// A much shorter interval than the 30-minute convention, because the
    /// benchmark swarms live for seconds, not hours.
    #[serde(default = "AnnouncePolicy::default_interval")]
    pub interval: u32,

    /// Minimum announce interval. Clients must not reannounce more
    /// frequently than this.
    #[serde(default = "AnnouncePolicy::default_interval_min")]
    pub interval_min: u32,
}

impl Default for AnnouncePolicy {
    fn default() -> Self {
        Self {
            interval: Self::default_interval(),
            interval_min: Self::default_interval_min(),
        }
    }
}

impl AnnouncePolicy {
    fn default_interval() -> u32 {
        60
    }

    fn default_interval_min() -> u32 {
        30
    }
}

/// Peer expiry policy.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Constructor)]
pub struct TrackerPolicy {
    /// Maximum time in seconds that a peer can be inactive before being
    /// removed from the torrent peer list. Torrents left without peers are
    /// removed entirely.
    #[serde(default = "TrackerPolicy::default_max_peer_timeout")]
    pub max_peer_timeout: u32,
}

impl Default for TrackerPolicy {
    fn default() -> Self {
        Self {
            max_peer_timeout: Self::default_max_peer_timeout(),
        }
    }
}

impl TrackerPolicy {
    fn default_max_peer_timeout() -> u32 {
        1800
    }
}
