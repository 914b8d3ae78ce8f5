//! One entry in the swarm map: the peer set of a single torrent.
//!
//! Peers are keyed by their socket address `(ip, port)`. A new announce
//! from the same address replaces the previous record (upsert semantics),
//! so the registry retains exactly one record per key.
use std::collections::BTreeMap;
use std::net::SocketAddr;

use transfer_bench_primitives::swarm_metadata::SwarmMetadata;
use transfer_bench_primitives::{peer, DurationSinceUnixEpoch};

/// The peer set of one torrent.
#[derive(Clone, Debug, Default)]
pub struct Entry {
    /// The swarm: a network of peers downloading the same torrent.
    pub peers: BTreeMap<SocketAddr, peer::Peer>,
}

impl Entry {
    /// Inserts or replaces the record for the peer's `(ip, port)` key.
    /// It always succeeds.
    pub fn upsert_peer(&mut self, peer: &peer::Peer) {
        self.peers.insert(peer.peer_addr, *peer);
    }

    /// The seeder/leecher counters for this swarm. Seeders are the peers
    /// with zero bytes left to download.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn get_swarm_metadata(&self) -> SwarmMetadata {
        let complete: u32 = self.peers.values().filter(|peer| peer.is_seeder()).count() as u32;
        let incomplete: u32 = self.peers.len() as u32 - complete;

        SwarmMetadata { complete, incomplete }
    }

    #[must_use]
    pub fn peers_is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    #[must_use]
    pub fn get_peers_len(&self) -> usize {
        self.peers.len()
    }

    /// The peer list for a client: all the peers in the swarm except the
    /// client itself. A peer must never receive its own address in its
    /// candidate list.
    #[must_use]
    pub fn get_peers_for_client(&self, client: &SocketAddr, limit: Option<usize>) -> Vec<peer::Peer> {
        match limit {
            Some(limit) => self
                .peers
                .values()
                .filter(|peer| peer.peer_addr != *client)
                .take(limit)
                .copied()
                .collect(),
            None => self.peers.values().filter(|peer| peer.peer_addr != *client).copied().collect(),
        }
    }

    /// Removes every peer whose last announce is older than `current_cutoff`.
    /// A peer seen exactly at the cutoff is not yet stale.
    pub fn remove_inactive_peers(&mut self, current_cutoff: DurationSinceUnixEpoch) {
        self.peers.retain(|_, peer| peer.updated >= current_cutoff);
    }
}

#[cfg(test)]
mod tests {
    mod torrent_entry {
        use std::net::{IpAddr, Ipv4Addr, SocketAddr};
        use std::ops::Sub;
        use std::time::Duration;

        use transfer_bench_clock::clock::stopped::Stopped as _;
        use transfer_bench_clock::clock::{self, Time};
        use transfer_bench_configuration::TORRENT_PEERS_LIMIT;
        use transfer_bench_primitives::peer::fixture::PeerBuilder;
        use transfer_bench_primitives::peer::{self};

        use crate::core::torrent::Entry;
        use crate::CurrentClock;

        fn peer_at(port: u16) -> peer::Peer {
            PeerBuilder::default()
                .with_peer_addr(&SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), port))
                .last_updated_on(CurrentClock::now())
                .build()
        }

        #[test]
        fn the_default_torrent_entry_should_contain_an_empty_list_of_peers() {
            let torrent_entry = Entry::default();

            assert_eq!(torrent_entry.get_peers_len(), 0);
        }

        #[test]
        fn a_new_peer_can_be_added_to_a_torrent_entry() {
            let mut torrent_entry = Entry::default();
            let torrent_peer = peer_at(8080);

            torrent_entry.upsert_peer(&torrent_peer);

            assert_eq!(torrent_entry.get_peers_len(), 1);
        }

        #[test]
        fn an_upsert_for_the_same_address_should_retain_exactly_one_record() {
            let mut torrent_entry = Entry::default();

            torrent_entry.upsert_peer(&peer_at(8080));
            torrent_entry.upsert_peer(&peer_at(8080));

            assert_eq!(torrent_entry.get_peers_len(), 1);
        }

        #[test]
        fn an_upsert_for_the_same_address_should_refresh_the_last_seen_timestamp() {
            let mut torrent_entry = Entry::default();

            clock::Stopped::local_set(&Duration::from_secs(100));
            torrent_entry.upsert_peer(&peer_at(8080));

            clock::Stopped::local_add(&Duration::from_secs(50)).unwrap();
            torrent_entry.upsert_peer(&peer_at(8080));

            let last_seen = torrent_entry.peers.values().next().unwrap().updated;
            assert_eq!(last_seen, Duration::from_secs(150));
        }

        #[test]
        fn two_peers_with_the_same_ip_but_different_port_should_be_considered_different_peers() {
            let mut torrent_entry = Entry::default();

            torrent_entry.upsert_peer(&peer_at(8080));
            torrent_entry.upsert_peer(&peer_at(8081));

            assert_eq!(torrent_entry.get_peers_len(), 2);
        }

        #[test]
        fn the_peer_list_for_a_client_should_not_contain_the_client_itself() {
            let mut torrent_entry = Entry::default();
            let torrent_peer = peer_at(8080);
            torrent_entry.upsert_peer(&torrent_peer);

            let peers = torrent_entry.get_peers_for_client(&torrent_peer.peer_addr, None);

            assert_eq!(peers.len(), 0);
        }

        #[test]
        fn the_peer_list_for_a_client_should_contain_the_other_peers() {
            let mut torrent_entry = Entry::default();
            let client = peer_at(8080);
            let other = peer_at(8081);
            torrent_entry.upsert_peer(&client);
            torrent_entry.upsert_peer(&other);

            let peers = torrent_entry.get_peers_for_client(&client.peer_addr, None);

            assert_eq!(peers, vec![other]);
        }

        #[test]
        fn the_peer_list_should_be_limited() {
            let mut torrent_entry = Entry::default();

            // One more peer than the limit.
            for i in 0..=TORRENT_PEERS_LIMIT {
                #[allow(clippy::cast_possible_truncation)]
                torrent_entry.upsert_peer(&peer_at(8000 + i as u16));
            }

            let client = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 1);
            let peers = torrent_entry.get_peers_for_client(&client, Some(TORRENT_PEERS_LIMIT));

            assert_eq!(peers.len(), TORRENT_PEERS_LIMIT);
        }

        #[test]
        fn torrent_stats_should_count_seeders_and_leechers() {
            let mut torrent_entry = Entry::default();

            torrent_entry.upsert_peer(
                &PeerBuilder::seeder()
                    .with_peer_addr(&SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080))
                    .build(),
            );
            torrent_entry.upsert_peer(
                &PeerBuilder::leecher()
                    .with_peer_addr(&SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2)), 8080))
                    .build(),
            );

            let stats = torrent_entry.get_swarm_metadata();

            assert_eq!(stats.complete, 1);
            assert_eq!(stats.incomplete, 1);
        }

        #[test]
        fn a_torrent_entry_should_remove_a_peer_not_updated_after_a_timeout_in_seconds() {
            let mut torrent_entry = Entry::default();

            let timeout = 120u32;

            let now = clock::Working::now();
            clock::Stopped::local_set(&now);

            let timeout_seconds_before_now = now.sub(Duration::from_secs(u64::from(timeout)));
            let inactive_peer = PeerBuilder::default()
                .last_updated_on(timeout_seconds_before_now.sub(Duration::from_secs(1)))
                .build();
            torrent_entry.upsert_peer(&inactive_peer);

            let current_cutoff = CurrentClock::now_sub(&Duration::from_secs(u64::from(timeout))).unwrap_or_default();
            torrent_entry.remove_inactive_peers(current_cutoff);

            assert_eq!(torrent_entry.get_peers_len(), 0);
        }
    }
}
