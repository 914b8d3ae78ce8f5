//! Background drain of engine-level notifications.
//!
//! The drain task consumes alerts purely for observability and statistics:
//! it has no effect on the session state machine and can be disabled
//! without changing correctness.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use super::engine::{Alert, TorrentEngine};

/// Byte and event counters accumulated from the engine alerts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferTotals {
    pub peers_connected: u64,
    pub pieces_finished: u64,
    pub bytes_read: u64,
}

/// A background task that continuously drains the engine alert queue.
pub struct AlertMonitor {
    keep_running: Arc<AtomicBool>,
    totals: Arc<Mutex<TransferTotals>>,
    task: JoinHandle<()>,
}

impl AlertMonitor {
    /// Spawns the drain task polling the engine every `poll_interval`.
    #[must_use]
    pub fn start(engine: Arc<dyn TorrentEngine>, poll_interval: Duration) -> Self {
        let keep_running = Arc::new(AtomicBool::new(true));
        let totals = Arc::new(Mutex::new(TransferTotals::default()));

        let task = tokio::spawn(drain_alerts(
            engine,
            poll_interval,
            keep_running.clone(),
            totals.clone(),
        ));

        Self {
            keep_running,
            totals,
            task,
        }
    }

    /// A snapshot of the accumulated counters.
    ///
    /// # Panics
    ///
    /// Will panic if the totals lock is poisoned.
    #[must_use]
    pub fn totals(&self) -> TransferTotals {
        *self.totals.lock().expect("the totals lock should not be poisoned")
    }

    /// Stops the drain task and waits for it to finish.
    pub async fn stop(self) {
        self.keep_running.store(false, Ordering::Relaxed);
        let _ = self.task.await;
    }
}

async fn drain_alerts(
    engine: Arc<dyn TorrentEngine>,
    poll_interval: Duration,
    keep_running: Arc<AtomicBool>,
    totals: Arc<Mutex<TransferTotals>>,
) {
    while keep_running.load(Ordering::Relaxed) {
        for alert in engine.pop_alerts() {
            let mut totals = totals.lock().expect("the totals lock should not be poisoned");

            match alert {
                Alert::PeerConnected { peer_addr } => {
                    debug!("new peer connected: {peer_addr}");
                    totals.peers_connected += 1;
                }
                Alert::PieceRead { bytes } => {
                    totals.bytes_read += bytes;
                }
                Alert::PieceFinished { piece_index } => {
                    debug!("piece finished: {piece_index}");
                    totals.pieces_finished += 1;
                }
            }
        }

        tokio::time::sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::str::FromStr;
    use std::sync::Arc;
    use std::time::Duration;

    use super::super::engine::{Alert, MockTorrentEngine, TorrentEngine};
    use super::AlertMonitor;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn it_should_accumulate_the_drained_alerts() {
        let mut engine = MockTorrentEngine::new();
        engine.expect_pop_alerts().returning(|| {
            vec![
                Alert::PeerConnected {
                    peer_addr: SocketAddr::from_str("127.0.0.1:6881").unwrap(),
                },
                Alert::PieceRead { bytes: 16384 },
                Alert::PieceFinished { piece_index: 0 },
            ]
        });

        let engine: Arc<dyn TorrentEngine> = Arc::new(engine);
        let monitor = AlertMonitor::start(engine, Duration::from_millis(500));

        // Let the drain task run at least one iteration.
        tokio::time::sleep(Duration::from_millis(600)).await;

        let totals = monitor.totals();
        assert!(totals.peers_connected >= 1);
        assert!(totals.bytes_read >= 16384);
        assert!(totals.pieces_finished >= 1);

        monitor.stop().await;
    }
}
