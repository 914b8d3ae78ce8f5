use serde::{Deserialize, Serialize};

/// The `[file_server]` section: configuration for the HTTP file-transfer
/// endpoints used by the HTTP/1.1 and HTTP/2 benchmarks.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct FileServer {
    /// The address the file server will bind to.
    #[serde(default = "FileServer::default_bind_address")]
    pub bind_address: String,

    /// Directory with the files served via `GET /files/:filename`.
    #[serde(default = "FileServer::default_files_dir")]
    pub files_dir: String,

    /// Directory where `POST /upload/:filename` uploads are stored.
    #[serde(default = "FileServer::default_uploads_dir")]
    pub uploads_dir: String,

    /// Weather to serve TLS. With TLS enabled clients can negotiate HTTP/2
    /// via ALPN; without it HTTP/2 requires prior knowledge (h2c).
    #[serde(default = "FileServer::default_ssl_enabled")]
    pub ssl_enabled: bool,

    /// Path to the TLS certificate file, when `ssl_enabled` is `true`.
    #[serde(default = "FileServer::default_ssl_cert_path")]
    pub ssl_cert_path: Option<String>,

    /// Path to the TLS key file, when `ssl_enabled` is `true`.
    #[serde(default = "FileServer::default_ssl_key_path")]
    pub ssl_key_path: Option<String>,
}

impl Default for FileServer {
    fn default() -> Self {
        Self {
            bind_address: Self::default_bind_address(),
            files_dir: Self::default_files_dir(),
            uploads_dir: Self::default_uploads_dir(),
            ssl_enabled: Self::default_ssl_enabled(),
            ssl_cert_path: Self::default_ssl_cert_path(),
            ssl_key_path: Self::default_ssl_key_path(),
        }
    }
}

impl FileServer {
    fn default_bind_address() -> String {
        "0.0.0.0:8000".to_owned()
    }

    fn default_files_dir() -> String {
        "./files".to_owned()
    }

    fn default_uploads_dir() -> String {
        "./uploads".to_owned()
    }

    fn default_ssl_enabled() -> bool {
        false
    }

    fn default_ssl_cert_path() -> Option<String> {
        None
    }

    fn default_ssl_key_path() -> Option<String> {
        None
    }
}
