//! Integration tests for the file server and the HTTP benchmark client.
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use transfer_bench::console::clients::http::{Client, Protocol};
use transfer_bench::servers::file::{launcher, FileStore};
use url::Url;

async fn start_file_server(files_dir: &Path, uploads_dir: &Path) -> SocketAddr {
    let store = Arc::new(FileStore {
        files_dir: files_dir.to_path_buf(),
        uploads_dir: uploads_dir.to_path_buf(),
    });

    let bind_to = "127.0.0.1:0".parse().expect("a valid bind address");

    let (addr, _handle) = launcher::start_with_graceful_shutdown(bind_to, store, std::future::pending())
        .await
        .expect("the file server should start");

    addr
}

fn base_url(addr: &SocketAddr) -> Url {
    format!("http://{addr}").parse().expect("a valid base URL")
}

#[tokio::test]
async fn a_file_should_be_downloaded_and_saved_locally() {
    let server_dir = TempDir::new().unwrap();
    let client_dir = TempDir::new().unwrap();

    let payload = vec![0x42u8; 10_000];
    std::fs::write(server_dir.path().join("A_10kB"), &payload).unwrap();

    let addr = start_file_server(server_dir.path(), server_dir.path()).await;

    let client = Client::new(
        base_url(&addr),
        Protocol::Http11,
        client_dir.path().to_path_buf(),
        client_dir.path().to_path_buf(),
    )
    .unwrap();

    let report = client.download("A_10kB").await.unwrap();

    assert_eq!(report.file_size, 10_000);
    assert!(report.total_bytes > report.file_size);

    let downloaded = std::fs::read(client_dir.path().join("A_10kB")).unwrap();
    assert_eq!(downloaded, payload);
}

#[tokio::test]
async fn an_upload_should_be_stored_on_the_server() {
    let server_dir = TempDir::new().unwrap();
    let uploads_dir = TempDir::new().unwrap();
    let client_dir = TempDir::new().unwrap();

    let payload = vec![0x42u8; 2_000];
    std::fs::write(client_dir.path().join("B_10kB"), &payload).unwrap();

    let addr = start_file_server(server_dir.path(), uploads_dir.path()).await;

    let client = Client::new(
        base_url(&addr),
        Protocol::Http11,
        client_dir.path().to_path_buf(),
        client_dir.path().to_path_buf(),
    )
    .unwrap();

    let report = client.upload("B_10kB").await.unwrap();

    assert_eq!(report.file_size, 2_000);

    let stored = std::fs::read(uploads_dir.path().join("B_10kB")).unwrap();
    assert_eq!(stored, payload);
}

#[tokio::test]
async fn downloading_a_missing_file_should_fail() {
    let server_dir = TempDir::new().unwrap();
    let client_dir = TempDir::new().unwrap();

    let addr = start_file_server(server_dir.path(), server_dir.path()).await;

    let client = Client::new(
        base_url(&addr),
        Protocol::Http11,
        client_dir.path().to_path_buf(),
        client_dir.path().to_path_buf(),
    )
    .unwrap();

    let result = client.download("missing").await;

    assert!(result.is_err());
}

#[tokio::test]
async fn the_plaintext_server_should_accept_http2_with_prior_knowledge() {
    let server_dir = TempDir::new().unwrap();
    let client_dir = TempDir::new().unwrap();

    std::fs::write(server_dir.path().join("A_10kB"), vec![0x42u8; 100]).unwrap();

    let addr = start_file_server(server_dir.path(), server_dir.path()).await;

    let client = Client::new(
        base_url(&addr),
        Protocol::Http2,
        client_dir.path().to_path_buf(),
        client_dir.path().to_path_buf(),
    )
    .unwrap();

    let version = client.http_version().await.unwrap();
    assert_eq!(version, "HTTP/2.0");

    let report = client.download("A_10kB").await.unwrap();
    assert_eq!(report.file_size, 100);
}
