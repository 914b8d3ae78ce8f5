//! HTTP transfer client used by the HTTP/1.1 and HTTP/2 benchmarks.
//!
//! The protocol is pinned when the client is built: HTTP/1.1 clients only
//! speak HTTP/1.1, HTTP/2 clients use prior knowledge (h2c against the
//! plaintext file server, negotiated h2 against a TLS deployment).
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use serde::Serialize;
use tracing::info;
use url::Url;

/// Bytes of multipart framing (boundaries plus part headers) accounted for
/// an upload when the exact request body is not observable.
const MULTIPART_OVERHEAD_ESTIMATE: u64 = 200;

/// The HTTP protocol version the client is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Protocol {
    /// HTTP/1.1, one request per connection in flight.
    Http11,
    /// HTTP/2 with prior knowledge.
    Http2,
}

impl Protocol {
    /// Short name used in result file names.
    #[must_use]
    pub fn slug(&self) -> &'static str {
        match self {
            Protocol::Http11 => "http1",
            Protocol::Http2 => "http2",
        }
    }

    /// The version string reported for connections using this protocol.
    #[must_use]
    pub fn expected_version(&self) -> &'static str {
        match self {
            Protocol::Http11 => "HTTP/1.1",
            Protocol::Http2 => "HTTP/2.0",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http11 => write!(f, "HTTP/1.1"),
            Protocol::Http2 => write!(f, "HTTP/2"),
        }
    }
}

/// The direction of one benchmarked transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Download,
    Upload,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Download => write!(f, "download"),
            Direction::Upload => write!(f, "upload"),
        }
    }
}

/// What one transfer achieved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferReport {
    pub filename: String,
    pub direction: Direction,
    pub file_size: u64,
    /// Wall time of the transfer, in seconds.
    pub transfer_time: f64,
    /// Payload bytes per second.
    pub throughput: f64,
    /// Payload plus protocol overhead (headers, multipart framing).
    pub total_bytes: u64,
}

/// The HTTP benchmark client.
pub struct Client {
    base_url: Url,
    inner: reqwest::Client,
    files_dir: PathBuf,
    downloads_dir: PathBuf,
}

impl Client {
    /// Builds a client pinned to one protocol version.
    ///
    /// # Errors
    ///
    /// Will return an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: Url, protocol: Protocol, files_dir: PathBuf, downloads_dir: PathBuf) -> anyhow::Result<Self> {
        let builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .pool_max_idle_per_host(1);

        let builder = match protocol {
            Protocol::Http11 => builder.http1_only(),
            Protocol::Http2 => builder.http2_prior_knowledge(),
        };

        let inner = builder.build().context("failed to build the HTTP client")?;

        Ok(Self {
            base_url,
            inner,
            files_dir,
            downloads_dir,
        })
    }

    /// Reports the negotiated HTTP version for a probe request.
    ///
    /// # Errors
    ///
    /// Will return an error if the file server is unreachable.
    pub async fn http_version(&self) -> anyhow::Result<String> {
        let url = self.base_url.join("list").context("failed to build the list URL")?;
        let response = self.inner.get(url).send().await.context("failed to reach the file server")?;

        Ok(format!("{:?}", response.version()))
    }

    /// Downloads a file from the server via a `GET` request and saves it
    /// under the downloads directory.
    ///
    /// # Errors
    ///
    /// Will return an error if the request fails, the server answers with
    /// an error status or the payload cannot be written to disk.
    pub async fn download(&self, filename: &str) -> anyhow::Result<TransferReport> {
        let url = self
            .base_url
            .join(&format!("files/{filename}"))
            .context("failed to build the download URL")?;

        let start = Instant::now();

        let response = self
            .inner
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to download {filename}"))?
            .error_for_status()
            .with_context(|| format!("the server refused to serve {filename}"))?;

        let headers_size: usize = response.headers().iter().map(|(name, value)| name.as_str().len() + value.len()).sum();

        let body = response
            .bytes()
            .await
            .with_context(|| format!("failed to read the body of {filename}"))?;

        let transfer_time = start.elapsed().as_secs_f64();

        tokio::fs::write(self.downloads_dir.join(filename), &body)
            .await
            .with_context(|| format!("failed to save the downloaded {filename}"))?;

        let file_size = body.len() as u64;

        Ok(TransferReport {
            filename: filename.to_owned(),
            direction: Direction::Download,
            file_size,
            transfer_time,
            throughput: throughput(file_size, transfer_time),
            total_bytes: file_size + headers_size as u64,
        })
    }

    /// Uploads a file to the server via a multipart `POST` request.
    ///
    /// # Errors
    ///
    /// Will return an error if the file is missing locally, the request
    /// fails or the server answers with an error status.
    pub async fn upload(&self, filename: &str) -> anyhow::Result<TransferReport> {
        let file_path = self.files_dir.join(filename);

        if !file_path.exists() {
            bail!("file {filename} not found in {}", self.files_dir.display());
        }

        let contents = tokio::fs::read(&file_path)
            .await
            .with_context(|| format!("failed to read {filename}"))?;
        let file_size = contents.len() as u64;

        let part = reqwest::multipart::Part::bytes(contents)
            .file_name(filename.to_owned())
            .mime_str("application/octet-stream")
            .context("failed to build the multipart body")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = self
            .base_url
            .join(&format!("upload/{filename}"))
            .context("failed to build the upload URL")?;

        let start = Instant::now();

        let response = self
            .inner
            .post(url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("failed to upload {filename}"))?
            .error_for_status()
            .with_context(|| format!("the server refused the upload of {filename}"))?;

        let transfer_time = start.elapsed().as_secs_f64();

        let headers_size: usize = response.headers().iter().map(|(name, value)| name.as_str().len() + value.len()).sum();

        info!("uploaded {filename} ({file_size} bytes) in {transfer_time:.4}s");

        Ok(TransferReport {
            filename: filename.to_owned(),
            direction: Direction::Upload,
            file_size,
            transfer_time,
            throughput: throughput(file_size, transfer_time),
            total_bytes: file_size + headers_size as u64 + MULTIPART_OVERHEAD_ESTIMATE,
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn throughput(file_size: u64, transfer_time: f64) -> f64 {
    if transfer_time > 0.0 {
        file_size as f64 / transfer_time
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::throughput;

    #[test]
    fn throughput_should_be_payload_bytes_per_second() {
        let value = throughput(10_000, 2.0);
        assert!((value - 5_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn throughput_should_be_zero_for_an_instant_transfer() {
        let value = throughput(10_000, 0.0);
        assert!(value.abs() < f64::EPSILON);
    }
}
