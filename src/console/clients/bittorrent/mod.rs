//! The `BitTorrent` benchmark client.
//!
//! It drives in-flight transfers to completion or timeout through an
//! external torrent engine. The engine implements the `BitTorrent` wire
//! protocol (piece selection, choke/unchoke, peer-wire handshakes); this
//! module only consumes its handle/status/re-announce/connect primitives.
pub mod alerts;
pub mod client;
pub mod engine;

pub use client::{Client, Outcome, Role, SessionId, SessionSettings, TransferMetrics};
