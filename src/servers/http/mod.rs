//! The HTTP announce service.
//!
//! It implements the announce half of the `BitTorrent` tracker protocol over
//! HTTP, as described in [BEP 03](https://www.bittorrent.org/beps/bep_0003.html)
//! and [BEP 23](https://www.bittorrent.org/beps/bep_0023.html) (compact peer
//! lists).
pub mod percent_encoding;
pub mod v1;
