//! Job starters for the long-running services.
//!
//! Each job spawns one server task. The jobs stop when the process receives
//! the global shutdown signal.
pub mod file_server;
pub mod http_tracker;
