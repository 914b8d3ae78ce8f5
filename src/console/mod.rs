//! Console applications: the benchmark clients and the experiment runner.
pub mod benchmarks;
pub mod clients;
