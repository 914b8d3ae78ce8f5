//! The swarm session monitor.
//!
//! One [`Client`] drives the in-flight transfers of one benchmark process.
//! Each transfer is a session owned exclusively by the monitor driving it:
//! created when the transfer begins, destroyed when it is stopped or the
//! process ends.
//!
//! The monitor polls the external torrent engine on a fixed cadence,
//! triggers periodic re-announcements, repairs lost peer connectivity and
//! decides when a transfer is complete or has timed out. Timeouts are a
//! terminal state with partial metrics, not an error.
use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};
use transfer_bench_configuration::Configuration;
use transfer_bench_primitives::info_hash::InfoHash;

use super::alerts::AlertMonitor;
use super::engine::{self, AddTorrentParams, TorrentEngine, TorrentHandle};

/// How often a leecher session forces a re-announce, in poll ticks.
const LEECH_REANNOUNCE_EVERY_TICKS: u32 = 10;

/// How often a seeder session forces a re-announce, in poll ticks.
const SEED_REANNOUNCE_EVERY_TICKS: u32 = 5;

/// A leecher is finished when the engine says so or when progress crosses
/// this threshold.
const PROGRESS_COMPLETE_THRESHOLD: f64 = 0.99;

/// The role of the benchmark process in the swarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Role {
    /// The peer that has the complete file and serves it.
    Seed,
    /// The peer that downloads the file.
    Leech,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Seed => write!(f, "seed"),
            Role::Leech => write!(f, "leech"),
        }
    }
}

/// Identifies one transfer session: the torrent infohash plus the run
/// number, so repeated runs of the same file do not collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn new(info_hash: &InfoHash, run: u32) -> Self {
        Self(format!("{info_hash}_{run}"))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The terminal state of a transfer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The transfer completed: the download finished, or a peer connected
    /// to the seeder.
    ///
    /// > **NOTICE**: for the seed role "a peer connected" is taken as
    /// completion without checking that any bytes were transferred. That is
    /// a benchmark simplification: a seeder's job here is to be
    /// discoverable and serve.
    Completed,
    /// The deadline passed first. Metrics are still collected.
    TimedOut,
}

/// Final metrics of a transfer session, computed regardless of which
/// terminal state was reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferMetrics {
    pub outcome: Outcome,
    pub transfer_time: Duration,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub total_bytes: u64,
    /// Arithmetic mean of the positive download-rate samples, in bytes per
    /// second, or a size/time estimate when no sample was ever positive.
    pub download_rate: f64,
    /// Arithmetic mean of the positive upload-rate samples, in bytes per
    /// second, or a size/time estimate when no sample was ever positive.
    pub upload_rate: f64,
    pub num_peers: u32,
}

/// Settings shared by all the sessions of one client.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Directory with the seeded files.
    pub files_dir: PathBuf,
    /// Directory where leeched files are saved.
    pub downloads_dir: PathBuf,
    /// Directory with the `.torrent` metadata files.
    pub torrents_dir: PathBuf,
    /// Poll cadence of the monitor.
    pub poll_interval: Duration,
    /// How long a seeder waits for its first peer before giving up.
    pub seed_grace: Duration,
    /// The well-known seeder address leechers reconnect to when they lose
    /// all peers.
    pub seeder_address: SocketAddr,
    /// Ports the seeder proactively connects to when it starts serving.
    pub leecher_ports: Vec<u16>,
}

impl SessionSettings {
    /// Builds the settings from the benchmark configuration section.
    ///
    /// # Errors
    ///
    /// Will return an error if the configured seeder address is not a valid
    /// socket address.
    pub fn from_config(config: &Configuration) -> Result<Self, Error> {
        let seeder_address = config
            .benchmark
            .seeder_address
            .parse()
            .map_err(|source| Error::InvalidSeederAddress {
                address: config.benchmark.seeder_address.clone(),
                source,
            })?;

        Ok(Self {
            files_dir: PathBuf::from(&config.benchmark.files_dir),
            downloads_dir: PathBuf::from(&config.benchmark.downloads_dir),
            torrents_dir: PathBuf::from(&config.benchmark.torrents_dir),
            poll_interval: Duration::from_millis(config.benchmark.poll_interval_ms),
            seed_grace: Duration::from_secs(config.benchmark.seed_grace_secs),
            seeder_address,
            leecher_ports: config.benchmark.leecher_ports.clone(),
        })
    }
}

/// Errors returned by the [`Client`].
#[derive(Error, Debug)]
pub enum Error {
    /// The caller referenced a session that was never started or was
    /// already stopped.
    #[error("no active transfer session with id {session_id}")]
    UnknownSession { session_id: SessionId },

    #[error("invalid seeder address {address}: {source}")]
    InvalidSeederAddress {
        address: String,
        source: std::net::AddrParseError,
    },

    #[error(transparent)]
    Engine(#[from] engine::Error),
}

/// What the monitor needs to drive one session, cloned out of the session
/// table so the poll loop never holds the table lock.
struct SessionSnapshot {
    handle: Arc<dyn TorrentHandle>,
    role: Role,
    fname: String,
    total_size: u64,
    start: Instant,
}

struct TransferSession {
    handle: Arc<dyn TorrentHandle>,
    role: Role,
    fname: String,
    total_size: u64,
    start: Instant,
}

/// The `BitTorrent` benchmark client: a session table plus the monitor
/// loops driving each transfer.
pub struct Client {
    role: Role,
    engine: Arc<dyn TorrentEngine>,
    settings: SessionSettings,
    sessions: Mutex<HashMap<SessionId, TransferSession>>,
    alert_monitor: Mutex<Option<AlertMonitor>>,
}

impl Client {
    /// Creates a client and spawns the background alert drain.
    #[must_use]
    pub fn new(role: Role, engine: Arc<dyn TorrentEngine>, settings: SessionSettings) -> Self {
        let alert_monitor = AlertMonitor::start(engine.clone(), settings.poll_interval);

        info!("bittorrent client running in {role} mode");

        Self {
            role,
            engine,
            settings,
            sessions: Mutex::new(HashMap::new()),
            alert_monitor: Mutex::new(Some(alert_monitor)),
        }
    }

    /// Starts seeding a file, proactively connecting to the known leecher
    /// ports (best effort, failures ignored).
    ///
    /// Returns the new session id and the payload size.
    ///
    /// # Errors
    ///
    /// Will return an error if the `.torrent` metadata file is missing or
    /// the engine rejects the torrent.
    pub fn seed_file(&self, fname: &str, run: u32) -> Result<(SessionId, u64), Error> {
        let handle = self.add_torrent(fname, self.settings.files_dir.clone(), true)?;

        for port in &self.settings.leecher_ports {
            let peer_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), *port);
            if let Err(err) = handle.connect_peer(peer_addr) {
                debug!("failed to connect to leecher on port {port}: {err}");
            }
        }

        let (session_id, total_size) = self.register(handle, Role::Seed, fname, run);
        info!("seeding started for {fname} (session={session_id})");

        Ok((session_id, total_size))
    }

    /// Starts downloading a file, proactively connecting to the known
    /// seeder (best effort, failures ignored).
    ///
    /// Returns the new session id and the payload size.
    ///
    /// # Errors
    ///
    /// Will return an error if the `.torrent` metadata file is missing or
    /// the engine rejects the torrent.
    pub fn download_file(&self, fname: &str, run: u32) -> Result<(SessionId, u64), Error> {
        let handle = self.add_torrent(fname, self.settings.downloads_dir.clone(), false)?;

        if let Err(err) = handle.connect_peer(self.settings.seeder_address) {
            debug!("failed to connect to the seeder: {err}");
        }

        let (session_id, total_size) = self.register(handle, Role::Leech, fname, run);
        info!("download begun for {fname} (session={session_id})");

        Ok((session_id, total_size))
    }

    fn add_torrent(&self, fname: &str, save_path: PathBuf, seed_mode: bool) -> Result<Arc<dyn TorrentHandle>, Error> {
        let torrent_file = self.settings.torrents_dir.join(format!("{fname}.torrent"));

        if !torrent_file.exists() {
            return Err(engine::Error::TorrentFileNotFound {
                path: torrent_file.display().to_string(),
            }
            .into());
        }

        Ok(self.engine.add_torrent(AddTorrentParams {
            torrent_file,
            save_path,
            seed_mode,
        })?)
    }

    /// # Panics
    ///
    /// Will panic if the session table lock is poisoned.
    fn register(&self, handle: Arc<dyn TorrentHandle>, role: Role, fname: &str, run: u32) -> (SessionId, u64) {
        let session_id = SessionId::new(&handle.info_hash(), run);
        let total_size = handle.total_size();

        self.sessions
            .lock()
            .expect("the session table lock should not be poisoned")
            .insert(
                session_id.clone(),
                TransferSession {
                    handle,
                    role,
                    fname: fname.to_owned(),
                    total_size,
                    start: Instant::now(),
                },
            );

        (session_id, total_size)
    }

    /// Drives the session to its terminal state and returns its metrics.
    ///
    /// - Leech role: polls until the download finishes or the deadline
    ///   passes, re-announcing periodically and reconnecting to the seeder
    ///   when all peers are lost.
    /// - Seed role: waits a short bounded grace window for the first peer.
    ///
    /// Metrics are computed for both terminal states.
    ///
    /// # Errors
    ///
    /// Will return an error if `session_id` does not reference an active
    /// session. Start one with [`Client::seed_file`] or
    /// [`Client::download_file`] first.
    ///
    /// # Panics
    ///
    /// Will panic if the session table lock is poisoned.
    pub async fn wait_for_completion(&self, session_id: &SessionId, timeout: Duration) -> Result<TransferMetrics, Error> {
        let session = {
            let sessions = self.sessions.lock().expect("the session table lock should not be poisoned");
            let session = sessions.get(session_id).ok_or_else(|| Error::UnknownSession {
                session_id: session_id.clone(),
            })?;

            SessionSnapshot {
                handle: session.handle.clone(),
                role: session.role,
                fname: session.fname.clone(),
                total_size: session.total_size,
                start: session.start,
            }
        };

        let deadline = session.start + timeout;

        // Immediate forced re-announce on start. Transient failures never
        // abort a session.
        if let Err(err) = session.handle.force_reannounce() {
            debug!("re-announce failed: {err}");
        }

        let mut download_rates: Vec<f64> = vec![];
        let mut upload_rates: Vec<f64> = vec![];

        let outcome = match session.role {
            Role::Leech => {
                info!("downloading {}...", session.fname);
                self.poll_until_download_complete(&session.handle, deadline, &mut download_rates, &mut upload_rates)
                    .await
            }
            Role::Seed => {
                info!("seeding {}...", session.fname);
                self.poll_until_peer_connects(&session.handle, deadline, &mut download_rates, &mut upload_rates)
                    .await
            }
        };

        Ok(self.collect_metrics(&session, outcome, &download_rates, &upload_rates))
    }

    async fn poll_until_download_complete(
        &self,
        handle: &Arc<dyn TorrentHandle>,
        deadline: Instant,
        download_rates: &mut Vec<f64>,
        upload_rates: &mut Vec<f64>,
    ) -> Outcome {
        let mut ticks: u32 = 0;

        while Instant::now() < deadline {
            let status = handle.status();

            if ticks % LEECH_REANNOUNCE_EVERY_TICKS == 0 {
                if let Err(err) = handle.force_reannounce() {
                    debug!("re-announce failed: {err}");
                }
            }

            download_rates.push(status.download_rate);
            upload_rates.push(status.upload_rate);

            // Peer-loss repair: connectivity is optimistic, not guaranteed.
            if status.num_peers == 0 {
                if let Err(err) = handle.connect_peer(self.settings.seeder_address) {
                    debug!("failed to reconnect to the seeder: {err}");
                }
            }

            if status.is_finished || status.progress > PROGRESS_COMPLETE_THRESHOLD {
                return Outcome::Completed;
            }

            debug!("progress: {:.1}% - peers: {}", status.progress * 100.0, status.num_peers);

            ticks += 1;
            tokio::time::sleep(self.settings.poll_interval).await;
        }

        Outcome::TimedOut
    }

    async fn poll_until_peer_connects(
        &self,
        handle: &Arc<dyn TorrentHandle>,
        deadline: Instant,
        download_rates: &mut Vec<f64>,
        upload_rates: &mut Vec<f64>,
    ) -> Outcome {
        let grace_deadline = Instant::now() + self.settings.seed_grace;
        let mut ticks: u32 = 0;

        while Instant::now() < grace_deadline && Instant::now() < deadline {
            let status = handle.status();

            if ticks % SEED_REANNOUNCE_EVERY_TICKS == 0 {
                if let Err(err) = handle.force_reannounce() {
                    debug!("re-announce failed: {err}");
                }
            }

            download_rates.push(status.download_rate);
            upload_rates.push(status.upload_rate);

            if status.num_peers > 0 {
                info!("connected to {} peer(s)", status.num_peers);
                return Outcome::Completed;
            }

            debug!("waiting for peers...");

            ticks += 1;
            tokio::time::sleep(self.settings.poll_interval).await;
        }

        Outcome::TimedOut
    }

    #[allow(clippy::cast_precision_loss)]
    fn collect_metrics(
        &self,
        session: &SessionSnapshot,
        outcome: Outcome,
        download_rates: &[f64],
        upload_rates: &[f64],
    ) -> TransferMetrics {
        let transfer_time = session.start.elapsed();
        let status = session.handle.status();

        let mut file_size: u64 = 0;
        if session.role == Role::Leech && status.progress > PROGRESS_COMPLETE_THRESHOLD {
            let download_path = self.settings.downloads_dir.join(&session.fname);
            if let Ok(metadata) = std::fs::metadata(download_path) {
                file_size = metadata.len();
            }
        }

        let mut bytes_sent = status.total_upload;
        let mut bytes_received = status.total_download;

        // The engine can report zero transferred bytes for very fast local
        // transfers; fall back to the known payload size when there is
        // local completion evidence.
        if session.role == Role::Leech && bytes_received == 0 && file_size > 0 {
            bytes_received = file_size;
        }
        if session.role == Role::Seed && bytes_sent == 0 {
            bytes_sent = session.total_size;
        }

        let seconds = transfer_time.as_secs_f64();

        let download_rate = average_positive(download_rates).unwrap_or(if file_size > 0 && seconds > 0.0 {
            file_size as f64 / seconds
        } else {
            0.0
        });
        let upload_rate = average_positive(upload_rates).unwrap_or(if bytes_sent > 0 && seconds > 0.0 {
            bytes_sent as f64 / seconds
        } else {
            0.0
        });

        TransferMetrics {
            outcome,
            transfer_time,
            bytes_sent,
            bytes_received,
            total_bytes: bytes_sent + bytes_received,
            download_rate,
            upload_rate,
            num_peers: if status.num_peers > 0 { status.num_peers } else { 1 },
        }
    }

    /// Stops a session, removing the torrent from the engine.
    ///
    /// # Errors
    ///
    /// Will return an error if `session_id` does not reference an active
    /// session.
    ///
    /// # Panics
    ///
    /// Will panic if the session table lock is poisoned.
    pub fn stop(&self, session_id: &SessionId) -> Result<(), Error> {
        let session = self
            .sessions
            .lock()
            .expect("the session table lock should not be poisoned")
            .remove(session_id)
            .ok_or_else(|| Error::UnknownSession {
                session_id: session_id.clone(),
            })?;

        if let Err(err) = session.handle.remove() {
            debug!("failed to remove torrent (session={session_id}): {err}");
        }

        info!("stopped transfer (session={session_id})");

        Ok(())
    }

    /// The role this client was created with.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Stops the alert drain and every remaining session.
    ///
    /// # Panics
    ///
    /// Will panic if the session table lock is poisoned.
    pub async fn shutdown(&self) {
        let alert_monitor = self
            .alert_monitor
            .lock()
            .expect("the alert monitor lock should not be poisoned")
            .take();

        if let Some(alert_monitor) = alert_monitor {
            alert_monitor.stop().await;
        }

        let session_ids: Vec<SessionId> = self
            .sessions
            .lock()
            .expect("the session table lock should not be poisoned")
            .keys()
            .cloned()
            .collect();

        for session_id in session_ids {
            let _ = self.stop(&session_id);
        }

        info!("bittorrent client shutdown complete");
    }
}

/// Arithmetic mean of the positive samples. Zero-rate samples are idle
/// ticks, not achieved throughput, so they are excluded from the average.
#[allow(clippy::cast_precision_loss)]
fn average_positive(samples: &[f64]) -> Option<f64> {
    let positive: Vec<f64> = samples.iter().copied().filter(|sample| *sample > 0.0).collect();

    if positive.is_empty() {
        return None;
    }

    Some(positive.iter().sum::<f64>() / positive.len() as f64)
}
