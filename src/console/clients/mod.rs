//! Transfer clients used by the benchmarks.
pub mod bittorrent;
pub mod http;
