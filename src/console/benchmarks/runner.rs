//! The experiment orchestrator.
//!
//! It runs the benchmark matrix from the configuration: for `BitTorrent`
//! one concurrent task per file configuration, for HTTP a sequential loop
//! per file. Single failed transfers are logged and the run continues;
//! per-file results and summaries are written as CSV.
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info, warn};
use transfer_bench_configuration::{Benchmark, Configuration, FileConfig};
use url::Url;

use super::report;
use crate::console::clients::bittorrent::engine::TorrentEngine;
use crate::console::clients::bittorrent::{self, Outcome, Role, SessionSettings};
use crate::console::clients::http::{Client as HttpClient, Direction, Protocol, TransferReport};

/// Pause between consecutive runs of the same file.
const PAUSE_BETWEEN_RUNS: Duration = Duration::from_secs(1);

/// Pause between consecutive HTTP transfers.
const PAUSE_BETWEEN_TRANSFERS: Duration = Duration::from_millis(100);

/// Runs the whole HTTP benchmark matrix against a file server.
///
/// # Errors
///
/// Will return an error if the working directories cannot be created or the
/// file server is unreachable.
pub async fn run_http_benchmark(config: &Configuration, server_url: &Url, protocol: Protocol) -> anyhow::Result<()> {
    let benchmark = &config.benchmark;

    setup_dirs(benchmark)?;

    let client = HttpClient::new(
        server_url.clone(),
        protocol,
        PathBuf::from(&benchmark.files_dir),
        PathBuf::from(&benchmark.downloads_dir),
    )?;

    let version = client.http_version().await?;
    info!("connected using {version}");
    if version != protocol.expected_version() {
        warn!("expected {protocol}, server negotiated {version}");
    }

    let results_dir = PathBuf::from(&benchmark.results_dir);
    let mut summary_rows: Vec<HttpSummaryRow> = Vec::new();

    for file in &benchmark.files {
        if let Some(experiment) = run_http_experiment(&client, file, &results_dir).await {
            merge_summary(&mut summary_rows, &experiment);
        }
    }

    write_http_summary(&results_dir, protocol, &summary_rows)?;

    Ok(())
}

async fn run_http_experiment(client: &HttpClient, file: &FileConfig, results_dir: &Path) -> Option<HttpExperiment> {
    let filename = file.label();
    let direction = if file.prefix == "A" { Direction::Download } else { Direction::Upload };

    info!("starting experiment for {filename}, {} repetitions", file.repetitions);

    let mut reports: Vec<TransferReport> = Vec::new();

    for run in 1..=file.repetitions {
        info!("transfer {run}/{} for {filename}", file.repetitions);

        let result = match direction {
            Direction::Download => client.download(&filename).await,
            Direction::Upload => client.upload(&filename).await,
        };

        match result {
            Ok(report) => reports.push(report),
            Err(err) => error!("transfer of {filename} failed: {err:#}"),
        }

        tokio::time::sleep(PAUSE_BETWEEN_TRANSFERS).await;
    }

    if reports.is_empty() {
        return None;
    }

    let rows: Vec<Vec<String>> = reports
        .iter()
        .map(|report| {
            vec![
                report.filename.clone(),
                report.direction.to_string(),
                report.file_size.to_string(),
                report.transfer_time.to_string(),
                report.throughput.to_string(),
                report.total_bytes.to_string(),
            ]
        })
        .collect();

    let csv_path = results_dir.join(format!("{filename}_{direction}_results.csv"));
    if let Err(err) = report::write_csv(
        &csv_path,
        &[
            "Filename",
            "Direction",
            "File Size (B)",
            "Transfer Time (s)",
            "Throughput (B/s)",
            "Total Bytes (B)",
        ],
        &rows,
    ) {
        error!("failed to write {}: {err}", csv_path.display());
    } else {
        info!("results for {filename} saved to {}", csv_path.display());
    }

    let throughputs: Vec<f64> = reports.iter().map(|report| report.throughput).collect();
    #[allow(clippy::cast_precision_loss)]
    let avg_file_size = report::mean(&reports.iter().map(|report| report.file_size as f64).collect::<Vec<f64>>());
    #[allow(clippy::cast_precision_loss)]
    let avg_total_bytes = report::mean(&reports.iter().map(|report| report.total_bytes as f64).collect::<Vec<f64>>());

    Some(HttpExperiment {
        size: file.size.clone(),
        direction,
        throughputs,
        overhead_ratio: if avg_file_size > 0.0 { avg_total_bytes / avg_file_size } else { 0.0 },
    })
}

struct HttpExperiment {
    size: String,
    direction: Direction,
    /// Payload bytes per second, one sample per run.
    throughputs: Vec<f64>,
    overhead_ratio: f64,
}

#[derive(Default)]
struct HttpSummaryRow {
    size: String,
    download_avg_kbps: f64,
    download_std_kbps: f64,
    upload_avg_kbps: f64,
    upload_std_kbps: f64,
    download_overhead: f64,
    upload_overhead: f64,
}

/// Bytes per second to kilobits per second.
fn to_kbps(bytes_per_second: f64) -> f64 {
    bytes_per_second * 8.0 / 1000.0
}

fn merge_summary(rows: &mut Vec<HttpSummaryRow>, experiment: &HttpExperiment) {
    let row = match rows.iter_mut().find(|row| row.size == experiment.size) {
        Some(row) => row,
        None => {
            rows.push(HttpSummaryRow {
                size: experiment.size.clone(),
                ..HttpSummaryRow::default()
            });
            rows.last_mut().expect("a row was just pushed")
        }
    };

    match experiment.direction {
        Direction::Download => {
            row.download_avg_kbps = to_kbps(report::mean(&experiment.throughputs));
            row.download_std_kbps = to_kbps(report::std_deviation(&experiment.throughputs));
            row.download_overhead = experiment.overhead_ratio;
        }
        Direction::Upload => {
            row.upload_avg_kbps = to_kbps(report::mean(&experiment.throughputs));
            row.upload_std_kbps = to_kbps(report::std_deviation(&experiment.throughputs));
            row.upload_overhead = experiment.overhead_ratio;
        }
    }
}

fn write_http_summary(results_dir: &Path, protocol: Protocol, rows: &[HttpSummaryRow]) -> anyhow::Result<()> {
    let csv_rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.size.clone(),
                format!("{:.2}", row.download_avg_kbps),
                format!("{:.2}", row.download_std_kbps),
                format!("{:.2}", row.upload_avg_kbps),
                format!("{:.2}", row.upload_std_kbps),
                format!("{:.4}", row.download_overhead),
                format!("{:.4}", row.upload_overhead),
            ]
        })
        .collect();

    let table_path = results_dir.join(format!("{}_table_data.csv", protocol.slug()));

    report::write_csv(
        &table_path,
        &[
            "File Size",
            "Download Avg (kbps)",
            "Download StdDev",
            "Upload Avg (kbps)",
            "Upload StdDev",
            "Download Overhead",
            "Upload Overhead",
        ],
        &csv_rows,
    )
    .with_context(|| format!("failed to write {}", table_path.display()))?;

    info!("summary table saved to {}", table_path.display());

    Ok(())
}

/// Runs the whole `BitTorrent` benchmark matrix, one concurrent task per
/// file configuration.
///
/// # Errors
///
/// Will return an error if the working directories cannot be created or
/// the benchmark settings are invalid.
pub async fn run_bittorrent_benchmark(
    config: &Configuration,
    role: Role,
    engine: Arc<dyn TorrentEngine>,
) -> anyhow::Result<()> {
    let benchmark = &config.benchmark;

    setup_dirs(benchmark)?;

    let settings = SessionSettings::from_config(config)?;
    let client = Arc::new(bittorrent::Client::new(role, engine, settings));

    let timeout = Duration::from_secs(match role {
        Role::Leech => benchmark.transfer_timeout_secs,
        Role::Seed => benchmark.seed_timeout_secs,
    });

    // A seeder serves every configured leecher, so its expected payload is
    // a multiple of the file size.
    let fan_out = benchmark.leecher_ports.len().max(1) as u64;

    let results_dir = PathBuf::from(&benchmark.results_dir);

    let mut tasks = Vec::new();

    for file in benchmark.files.clone() {
        info!("===== starting experiment for {}: {} runs =====", file.label(), file.repetitions);

        let client = client.clone();
        let results_dir = results_dir.clone();

        tasks.push(tokio::spawn(async move {
            if let Err(err) = run_bittorrent_experiment(&client, &file, timeout, fan_out, &results_dir).await {
                error!("experiment for {} failed: {err:#}", file.label());
            }
        }));
    }

    futures::future::join_all(tasks).await;

    client.shutdown().await;

    Ok(())
}

#[allow(clippy::cast_precision_loss)]
async fn run_bittorrent_experiment(
    client: &bittorrent::Client,
    file: &FileConfig,
    timeout: Duration,
    fan_out: u64,
    results_dir: &Path,
) -> anyhow::Result<()> {
    let role = client.role();
    let filename = file.label();

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut download_rates: Vec<f64> = Vec::new();
    let mut upload_rates: Vec<f64> = Vec::new();
    let mut download_overheads: Vec<f64> = Vec::new();
    let mut upload_overheads: Vec<f64> = Vec::new();
    let mut file_size: u64 = 0;

    for run in 0..file.repetitions {
        info!("run {}/{} for {filename}", run + 1, file.repetitions);

        let started = match role {
            Role::Seed => client.seed_file(&filename, run),
            Role::Leech => client.download_file(&filename, run),
        };

        let (session_id, size) = match started {
            Ok(started) => started,
            Err(err) => {
                error!("could not start run {} for {filename}: {err}", run + 1);
                continue;
            }
        };
        file_size = size;

        let metrics = client
            .wait_for_completion(&session_id, timeout)
            .await
            .with_context(|| format!("failed to monitor the transfer of {filename}"))?;

        if metrics.outcome == Outcome::TimedOut {
            warn!("run {} for {filename} timed out after {}s", run + 1, timeout.as_secs());
        }

        let transfer_time = metrics.transfer_time.as_secs_f64();

        download_rates.push(metrics.download_rate);
        upload_rates.push(metrics.upload_rate);

        let mut row = vec![
            (run + 1).to_string(),
            filename.clone(),
            size.to_string(),
            transfer_time.to_string(),
        ];

        match role {
            Role::Leech => {
                let throughput = if transfer_time > 0.0 { size as f64 / transfer_time } else { 0.0 };
                row.extend([
                    throughput.to_string(),
                    metrics.total_bytes.to_string(),
                    metrics.bytes_sent.to_string(),
                    metrics.bytes_received.to_string(),
                    metrics.num_peers.to_string(),
                ]);
                download_overheads.push(metrics.bytes_received as f64 - size as f64);
                upload_overheads.push(metrics.bytes_sent as f64);
            }
            Role::Seed => {
                let expected = (size * fan_out) as f64;
                let throughput = if transfer_time > 0.0 { expected / transfer_time } else { 0.0 };
                let overhead_ratio = if expected > 0.0 { metrics.total_bytes as f64 / expected } else { 0.0 };
                row.extend([
                    throughput.to_string(),
                    metrics.total_bytes.to_string(),
                    metrics.bytes_sent.to_string(),
                    metrics.bytes_received.to_string(),
                    metrics.num_peers.to_string(),
                    overhead_ratio.to_string(),
                ]);
                download_overheads.push(metrics.bytes_received as f64);
                upload_overheads.push(metrics.bytes_sent as f64 - expected);
            }
        }

        rows.push(row);

        if let Err(err) = client.stop(&session_id) {
            error!("failed to stop run {} for {filename}: {err}", run + 1);
        }

        tokio::time::sleep(PAUSE_BETWEEN_RUNS).await;
    }

    let mut header = vec![
        "Run",
        "Filename",
        "File Size (B)",
        "Transfer Time (s)",
        "Throughput (B/s)",
        "Total Bytes",
        "Bytes Sent",
        "Bytes Received",
        "Num Peers",
    ];
    if role == Role::Seed {
        header.push("Overhead Ratio");
    }

    let csv_path = results_dir.join(format!("{filename}_{role}_results.csv"));
    report::write_csv(&csv_path, &header, &rows).with_context(|| format!("failed to write {}", csv_path.display()))?;
    info!("results for {filename} saved to {}", csv_path.display());

    let summary_row = vec![
        file_size.to_string(),
        format!("{:.2}", report::mean(&download_rates) / 1000.0),
        format!("{:.2}", report::std_deviation(&download_rates) / 1000.0),
        format!("{:.2}", report::mean(&upload_rates) / 1000.0),
        format!("{:.2}", report::std_deviation(&upload_rates) / 1000.0),
        format!("{:.2}", report::mean(&download_overheads)),
        format!("{:.2}", report::mean(&upload_overheads)),
    ];

    let summary_path = results_dir.join(format!("{filename}_{role}_summary.csv"));
    report::write_csv(
        &summary_path,
        &[
            "File Size",
            "Download Avg (kbps)",
            "Download StdDev",
            "Upload Avg (kbps)",
            "Upload StdDev",
            "Download Overhead",
            "Upload Overhead",
        ],
        &[summary_row],
    )
    .with_context(|| format!("failed to write {}", summary_path.display()))?;
    info!("summary for {filename} saved to {}", summary_path.display());

    Ok(())
}

fn setup_dirs(benchmark: &Benchmark) -> anyhow::Result<()> {
    for dir in [&benchmark.results_dir, &benchmark.downloads_dir, &benchmark.torrents_dir] {
        std::fs::create_dir_all(dir).with_context(|| format!("failed to create directory {dir}"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::str::FromStr;
    use std::sync::Arc;

    use transfer_bench_configuration::FileConfig;
    use transfer_bench_primitives::info_hash::InfoHash;
    use transfer_bench_test_helpers::configuration::ephemeral;

    use super::run_bittorrent_benchmark;
    use crate::console::clients::bittorrent::engine::{MockTorrentEngine, MockTorrentHandle, TorrentHandle, TorrentStatus};
    use crate::console::clients::bittorrent::Role;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn the_bittorrent_runner_should_write_the_result_and_summary_files() {
        let mut cfg = ephemeral();
        cfg.benchmark.files = vec![FileConfig {
            prefix: "A".to_owned(),
            size: "10kB".to_owned(),
            repetitions: 1,
        }];

        std::fs::create_dir_all(&cfg.benchmark.torrents_dir).unwrap();
        std::fs::write(Path::new(&cfg.benchmark.torrents_dir).join("A_10kB.torrent"), b"stub").unwrap();

        let mut handle = MockTorrentHandle::new();
        handle
            .expect_info_hash()
            .returning(|| InfoHash::from_str("3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0").unwrap());
        handle.expect_total_size().returning(|| 10_000);
        handle.expect_remove().returning(|| Ok(()));
        handle.expect_force_reannounce().returning(|| Ok(()));
        handle.expect_connect_peer().returning(|_| Ok(()));
        handle.expect_status().returning(|| TorrentStatus {
            progress: 1.0,
            num_peers: 1,
            download_rate: 100_000.0,
            total_download: 10_000,
            is_finished: true,
            ..Default::default()
        });

        let shared: Arc<dyn TorrentHandle> = Arc::new(handle);

        let mut engine = MockTorrentEngine::new();
        engine.expect_pop_alerts().returning(Vec::new);
        engine.expect_add_torrent().returning(move |_| Ok(shared.clone()));

        run_bittorrent_benchmark(&cfg, Role::Leech, Arc::new(engine)).await.unwrap();

        let results_dir = Path::new(&cfg.benchmark.results_dir);
        assert!(results_dir.join("A_10kB_leech_results.csv").exists());
        assert!(results_dir.join("A_10kB_leech_summary.csv").exists());
    }
}
