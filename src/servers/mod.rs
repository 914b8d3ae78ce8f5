//! Server components: the `BitTorrent` announce service and the HTTP file
//! server used by the HTTP/1.1 and HTTP/2 benchmarks.
pub mod file;
pub mod http;
pub mod signals;
