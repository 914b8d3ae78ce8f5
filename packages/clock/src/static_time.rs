//! The time when the application started. Used as the default time for the
//! stopped clock outside of tests.
use std::time::SystemTime;

lazy_static! {
    /// The time when the application started.
    pub static ref TIME_AT_APP_START: SystemTime = SystemTime::now();
}
