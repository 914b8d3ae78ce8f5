//! The HTTP benchmark client.
pub mod client;

pub use client::{Client, Direction, Protocol, TransferReport};
