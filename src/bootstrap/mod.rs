//! Setup for the application: configuration loading, logging and the jobs
//! that start the long-running services.
pub mod app;
pub mod jobs;
pub mod logging;
