//! File-transfer throughput benchmarks for `BitTorrent`, HTTP/1.1 and
//! HTTP/2.
//!
//! The suite measures how fast the same files move over three protocols,
//! using a real `BitTorrent` swarm (a tracker plus seeding/leeching peers)
//! and simple file-serving HTTP endpoints:
//!
//! - [`core`] and [`servers::http`] implement the announce half of the
//!   `BitTorrent` tracker protocol: the in-memory peer registry with expiry,
//!   seeder/leecher accounting and the compact bencoded response.
//! - [`servers::file`] serves and receives the benchmarked files over HTTP.
//! - [`console::clients::bittorrent`] monitors in-flight swarm transfers
//!   through an external torrent engine; the wire protocol itself is the
//!   engine's job, not ours.
//! - [`console::clients::http`] moves the same files with `reqwest`
//!   clients pinned to HTTP/1.1 or HTTP/2.
//! - [`console::benchmarks`] orchestrates the runs and writes the CSV
//!   summaries.
//!
//! Everything is configured through
//! [`transfer_bench_configuration::Configuration`].
pub mod app;
pub mod bootstrap;
pub mod console;
pub mod core;
pub mod servers;

/// This code needs to be copied into each crate.
/// Working version, for production.
#[cfg(not(test))]
pub(crate) type CurrentClock = transfer_bench_clock::clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
pub(crate) type CurrentClock = transfer_bench_clock::clock::Stopped;
