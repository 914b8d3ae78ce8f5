//! Requests for the HTTP announce service.
pub mod announce;
