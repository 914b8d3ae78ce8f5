//! The consumed interface of the external torrent engine.
//!
//! The benchmark client treats all of these primitives as given: it does
//! not implement wire-level peer communication. Engine status calls are
//! non-throwing snapshots; re-announce and connect calls are fallible but
//! callers treat their failures as best-effort.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use transfer_bench_primitives::info_hash::InfoHash;

/// A point-in-time snapshot of one torrent's transfer state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TorrentStatus {
    /// Download progress in the `0.0..=1.0` range.
    pub progress: f64,
    /// Number of peers currently connected.
    pub num_peers: u32,
    /// Instantaneous download rate, in bytes per second.
    pub download_rate: f64,
    /// Instantaneous upload rate, in bytes per second.
    pub upload_rate: f64,
    /// Total bytes downloaded for this torrent.
    pub total_download: u64,
    /// Total bytes uploaded for this torrent.
    pub total_upload: u64,
    /// Weather the engine considers the torrent finished.
    pub is_finished: bool,
}

/// Parameters for adding a torrent to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTorrentParams {
    /// Path to the `.torrent` metadata file.
    pub torrent_file: PathBuf,
    /// Directory where the payload is read from (seeding) or written to
    /// (leeching).
    pub save_path: PathBuf,
    /// Weather the engine should assume the payload is already complete.
    pub seed_mode: bool,
}

/// Engine-level notifications, drained for observability only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    PeerConnected { peer_addr: SocketAddr },
    PieceRead { bytes: u64 },
    PieceFinished { piece_index: u32 },
}

/// Errors reported by the engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("torrent metadata file not found: {path}")]
    TorrentFileNotFound { path: String },

    #[error("the engine rejected the operation: {reason}")]
    Operation { reason: String },
}

/// A live torrent within the engine.
#[cfg_attr(test, automock)]
pub trait TorrentHandle: Send + Sync {
    /// The torrent identifier from the metadata file.
    fn info_hash(&self) -> InfoHash;

    /// The total payload size from the metadata file.
    fn total_size(&self) -> u64;

    /// A snapshot of the transfer state. Non-throwing.
    fn status(&self) -> TorrentStatus;

    /// Asks the tracker for fresh peer candidates right now instead of
    /// waiting for the next announce interval.
    ///
    /// # Errors
    ///
    /// Will return an error if the engine cannot schedule the announce.
    fn force_reannounce(&self) -> Result<(), Error>;

    /// Attempts a direct connection to a known peer.
    ///
    /// # Errors
    ///
    /// Will return an error if the engine cannot schedule the connection
    /// attempt.
    fn connect_peer(&self, peer_addr: SocketAddr) -> Result<(), Error>;

    /// Removes the torrent from the engine, dropping its connections.
    ///
    /// # Errors
    ///
    /// Will return an error if the torrent was already removed.
    fn remove(&self) -> Result<(), Error>;
}

/// The torrent engine session.
#[cfg_attr(test, automock)]
pub trait TorrentEngine: Send + Sync {
    /// Adds a torrent to the engine and starts transferring.
    ///
    /// # Errors
    ///
    /// Will return an error if the metadata file cannot be loaded.
    fn add_torrent(&self, params: AddTorrentParams) -> Result<Arc<dyn TorrentHandle>, Error>;

    /// Drains the pending engine notifications.
    fn pop_alerts(&self) -> Vec<Alert>;
}
