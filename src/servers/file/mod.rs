//! The HTTP file server.
//!
//! Simple file-serving endpoints used by the HTTP/1.1 and HTTP/2
//! benchmarks: download a file with a `GET` request, upload one with a
//! multipart `POST`, list what is available.
//!
//! Served over plaintext the endpoints speak HTTP/1.1 and HTTP/2 with prior
//! knowledge (h2c); with TLS enabled clients can also negotiate HTTP/2 via
//! ALPN.
pub mod handlers;
pub mod launcher;
pub mod routes;

use std::path::PathBuf;

/// The directories the file server reads from and writes to.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory with the files served via `GET /files/:filename`.
    pub files_dir: PathBuf,
    /// Directory where `POST /upload/:filename` uploads are stored.
    pub uploads_dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(files_dir: &str, uploads_dir: &str) -> Self {
        Self {
            files_dir: PathBuf::from(files_dir),
            uploads_dir: PathBuf::from(uploads_dir),
        }
    }
}
