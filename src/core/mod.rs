//! The domain layer of the tracker.
//!
//! Its main responsibility is to handle the `announce` requests: keeping the
//! authoritative, in-memory view of who is currently participating in each
//! swarm and answering with the swarm statistics and a candidate peer list.
//!
//! > **NOTICE**: the `Tracker` is not responsible for handling the network
//! layer. It is used by the HTTP announce service which handles the network
//! layer and delegates here.
//!
//! There is no persistence: the tracker is a best-effort directory service
//! and a restart loses all swarm state. Trackers are a discovery aid, not
//! the source of truth for transfer correctness.
pub mod torrent;

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::time::Duration;

use derive_more::Constructor;
use tracing::debug;
use transfer_bench_clock::clock::Time;
use transfer_bench_configuration::tracker::AnnouncePolicy;
use transfer_bench_configuration::{Configuration, TORRENT_PEERS_LIMIT};
use transfer_bench_primitives::info_hash::InfoHash;
use transfer_bench_primitives::swarm_metadata::SwarmMetadata;
use transfer_bench_primitives::torrent_metrics::TorrentsMetrics;
use transfer_bench_primitives::{peer, DurationSinceUnixEpoch};

use self::torrent::Entry;
use crate::CurrentClock;

/// The tracker service. It owns the swarm map: the mapping from each
/// torrent identifier to its set of active peers.
pub struct Tracker {
    /// The announce intervals returned to the peers.
    announce_policy: AnnouncePolicy,

    /// Maximum peer inactivity before eviction.
    max_peer_timeout: Duration,

    /// Weather the tracker runs behind a reverse proxy.
    on_reverse_proxy: bool,

    /// The swarm map. A torrent present in the map always has at least one
    /// peer; eviction removes empty entries.
    torrents: RwLock<BTreeMap<InfoHash, Entry>>,
}

/// Structure that holds the data returned by the `announce` request.
#[derive(Clone, Debug, PartialEq, Eq, Constructor, Default)]
pub struct AnnounceData {
    /// The list of peers that are downloading the same torrent.
    /// It excludes the peer that made the request.
    pub peers: Vec<peer::Peer>,
    /// Swarm statistics.
    pub stats: SwarmMetadata,
    /// The announce intervals the client should honor.
    pub policy: AnnouncePolicy,
}

impl Tracker {
    #[must_use]
    pub fn new(config: &Configuration) -> Tracker {
        Tracker {
            announce_policy: config.tracker.announce_policy,
            max_peer_timeout: Duration::from_secs(u64::from(config.tracker.policy.max_peer_timeout)),
            on_reverse_proxy: config.tracker.on_reverse_proxy,
            torrents: RwLock::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub fn is_behind_reverse_proxy(&self) -> bool {
        self.on_reverse_proxy
    }

    #[must_use]
    pub fn get_announce_policy(&self) -> AnnouncePolicy {
        self.announce_policy
    }

    /// It handles an announce request.
    ///
    /// BEP 03: [The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html).
    ///
    /// The upsert of the announcing peer, the eviction of stale peers and
    /// the read of the peer list happen under one write guard: two
    /// concurrent announces for the same torrent must not interleave, and
    /// every response reflects a registry with no entry older than
    /// `max_peer_timeout`.
    ///
    /// # Panics
    ///
    /// Will panic if the swarm map lock is poisoned.
    pub fn announce(&self, info_hash: &InfoHash, peer: &peer::Peer) -> AnnounceData {
        debug!("announce: {peer:?}");

        let mut torrents = self.torrents.write().expect("the swarm map lock should not be poisoned");

        torrents.entry(*info_hash).or_default().upsert_peer(peer);

        let current_cutoff = CurrentClock::now_sub(&self.max_peer_timeout).unwrap_or_default();
        Self::remove_inactive_peers(&mut torrents, current_cutoff);

        // With a zero `max_peer_timeout` even the announcing peer is gone by
        // now, so the entry lookup can legitimately miss.
        let (stats, peers) = match torrents.get(info_hash) {
            Some(entry) => (
                entry.get_swarm_metadata(),
                entry.get_peers_for_client(&peer.peer_addr, Some(TORRENT_PEERS_LIMIT)),
            ),
            None => (SwarmMetadata::zeroed(), vec![]),
        };

        AnnounceData {
            peers,
            stats,
            policy: self.announce_policy,
        }
    }

    /// Removes every peer that has not announced since `current_cutoff`,
    /// then drops the torrents left without peers so no empty entries
    /// persist in the swarm map.
    fn remove_inactive_peers(torrents: &mut BTreeMap<InfoHash, Entry>, current_cutoff: DurationSinceUnixEpoch) {
        torrents.retain(|_, entry| {
            entry.remove_inactive_peers(current_cutoff);
            !entry.peers_is_empty()
        });
    }

    /// Aggregate counters for the diagnostic status page.
    ///
    /// # Panics
    ///
    /// Will panic if the swarm map lock is poisoned.
    #[must_use]
    pub fn get_metrics(&self) -> TorrentsMetrics {
        let torrents = self.torrents.read().expect("the swarm map lock should not be poisoned");

        let mut metrics = TorrentsMetrics::default();

        for entry in torrents.values() {
            let stats = entry.get_swarm_metadata();
            metrics.complete += u64::from(stats.complete);
            metrics.incomplete += u64::from(stats.incomplete);
            metrics.torrents += 1;
        }

        metrics
    }
}

#[cfg(test)]
mod tests {
    mod the_tracker {
        use std::net::{IpAddr, Ipv4Addr, SocketAddr};
        use std::str::FromStr;
        use std::time::Duration;

        use transfer_bench_clock::clock::stopped::Stopped as _;
        use transfer_bench_clock::clock::{self, Time};
        use transfer_bench_primitives::info_hash::InfoHash;
        use transfer_bench_primitives::peer::fixture::PeerBuilder;
        use transfer_bench_primitives::peer::{self};

        use crate::core::Tracker;
        use crate::CurrentClock;

        fn public_tracker() -> Tracker {
            Tracker::new(&transfer_bench_configuration::Configuration::default())
        }

        fn sample_info_hash() -> InfoHash {
            InfoHash::from_str("3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0").unwrap()
        }

        fn peer_at(ip: [u8; 4], port: u16) -> peer::Peer {
            PeerBuilder::default()
                .with_peer_addr(&SocketAddr::new(
                    IpAddr::V4(Ipv4Addr::new(ip[0], ip[1], ip[2], ip[3])),
                    port,
                ))
                .last_updated_on(CurrentClock::now())
                .build()
        }

        #[test]
        fn it_should_return_the_announce_policy_in_the_announce_data() {
            let tracker = public_tracker();

            let announce_data = tracker.announce(&sample_info_hash(), &peer_at([126, 0, 0, 1], 8080));

            assert_eq!(announce_data.policy.interval, 60);
            assert_eq!(announce_data.policy.interval_min, 30);
        }

        #[test]
        fn it_should_not_return_the_requesting_peer_in_the_peer_list() {
            let tracker = public_tracker();
            let peer = peer_at([126, 0, 0, 1], 8080);

            let announce_data = tracker.announce(&sample_info_hash(), &peer);

            assert_eq!(announce_data.peers, vec![]);
        }

        #[test]
        fn it_should_return_the_other_peers_in_the_swarm() {
            let tracker = public_tracker();
            let previously_announced_peer = peer_at([126, 0, 0, 1], 8080);
            tracker.announce(&sample_info_hash(), &previously_announced_peer);

            let announce_data = tracker.announce(&sample_info_hash(), &peer_at([126, 0, 0, 2], 8081));

            assert_eq!(announce_data.peers, vec![previously_announced_peer]);
        }

        #[test]
        fn it_should_overwrite_the_record_when_a_peer_reannounces_from_the_same_address() {
            let tracker = public_tracker();

            tracker.announce(
                &sample_info_hash(),
                &PeerBuilder::leecher()
                    .with_peer_addr(&SocketAddr::from_str("126.0.0.1:8080").unwrap())
                    .last_updated_on(CurrentClock::now())
                    .build(),
            );

            // Same (ip, port) key, now a seeder.
            let announce_data = tracker.announce(
                &sample_info_hash(),
                &PeerBuilder::seeder()
                    .with_peer_addr(&SocketAddr::from_str("126.0.0.1:8080").unwrap())
                    .last_updated_on(CurrentClock::now())
                    .build(),
            );

            assert_eq!(announce_data.stats.complete, 1);
            assert_eq!(announce_data.stats.incomplete, 0);
        }

        #[test]
        fn it_should_classify_a_peer_with_zero_bytes_left_as_a_seeder() {
            let tracker = public_tracker();

            let announce_data = tracker.announce(
                &sample_info_hash(),
                &PeerBuilder::seeder().last_updated_on(CurrentClock::now()).build(),
            );

            assert_eq!(announce_data.stats.complete, 1);
            assert_eq!(announce_data.stats.incomplete, 0);
        }

        #[test]
        fn it_should_classify_a_peer_with_bytes_left_as_a_leecher() {
            let tracker = public_tracker();

            let announce_data = tracker.announce(
                &sample_info_hash(),
                &PeerBuilder::leecher().last_updated_on(CurrentClock::now()).build(),
            );

            assert_eq!(announce_data.stats.complete, 0);
            assert_eq!(announce_data.stats.incomplete, 1);
        }

        #[test]
        fn it_should_evict_peers_that_have_not_announced_within_the_timeout() {
            let tracker = public_tracker();

            clock::Stopped::local_set(&Duration::from_secs(1_000_000));
            tracker.announce(&sample_info_hash(), &peer_at([126, 0, 0, 1], 8080));

            // Move past the 1800 s timeout and announce from another peer.
            clock::Stopped::local_add(&Duration::from_secs(1801)).unwrap();
            let announce_data = tracker.announce(&sample_info_hash(), &peer_at([126, 0, 0, 2], 8081));

            assert_eq!(announce_data.peers, vec![]);
            assert_eq!(announce_data.stats.complete + announce_data.stats.incomplete, 1);
        }

        #[test]
        fn it_should_keep_peers_that_announced_exactly_at_the_timeout_boundary() {
            let tracker = public_tracker();

            clock::Stopped::local_set(&Duration::from_secs(1_000_000));
            let boundary_peer = peer_at([126, 0, 0, 1], 8080);
            tracker.announce(&sample_info_hash(), &boundary_peer);

            // `now - last_seen == max_age` is not yet stale.
            clock::Stopped::local_add(&Duration::from_secs(1800)).unwrap();
            let announce_data = tracker.announce(&sample_info_hash(), &peer_at([126, 0, 0, 2], 8081));

            assert_eq!(announce_data.peers, vec![boundary_peer]);
        }

        #[test]
        fn it_should_remove_torrents_left_without_peers_from_the_swarm_map() {
            let tracker = public_tracker();
            let other_info_hash = InfoHash::from_str("5fff0e1c8ac414860310bcc1cb76ac28e960efbe").unwrap();

            clock::Stopped::local_set(&Duration::from_secs(1_000_000));
            tracker.announce(&sample_info_hash(), &peer_at([126, 0, 0, 1], 8080));

            clock::Stopped::local_add(&Duration::from_secs(1801)).unwrap();
            // Announcing for another torrent sweeps the whole swarm map.
            tracker.announce(&other_info_hash, &peer_at([126, 0, 0, 2], 8081));

            let metrics = tracker.get_metrics();
            assert_eq!(metrics.torrents, 1);
            assert_eq!(metrics.peers(), 1);
        }
    }
}
