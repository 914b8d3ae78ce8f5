//! Axum [`handlers`](axum#handlers) for the file-transfer endpoints.
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::FileStore;

/// The receipt returned for an upload, mirroring what the benchmark client
/// records for a download.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct UploadReceipt {
    pub filename: String,
    pub size: u64,
    pub transfer_time: f64,
    pub throughput: f64,
}

/// The `GET /list` response.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct FileList {
    pub files: Vec<String>,
}

/// It serves a file from the store via a `GET` request.
pub async fn get_file(State(store): State<Arc<FileStore>>, Path(filename): Path<String>) -> Response {
    let file_path = store.files_dir.join(&filename);

    match tokio::fs::read(&file_path).await {
        Ok(contents) => {
            info!(target: "FILE SERVER", "serving file {filename} ({} bytes)", contents.len());
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/octet-stream".to_owned()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                contents,
            )
                .into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, format!("File {filename} not found")).into_response(),
    }
}

/// It stores an uploaded file via a multipart `POST` request.
pub async fn upload_file(
    State(store): State<Arc<FileStore>>,
    Path(filename): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let start_time = Instant::now();

    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => return (StatusCode::BAD_REQUEST, "missing multipart file field").into_response(),
        Err(err) => return (StatusCode::BAD_REQUEST, format!("invalid multipart body: {err}")).into_response(),
    };

    let contents = match field.bytes().await {
        Ok(contents) => contents,
        Err(err) => return (StatusCode::BAD_REQUEST, format!("failed to read upload: {err}")).into_response(),
    };

    let file_path = store.uploads_dir.join(&filename);

    if let Err(err) = tokio::fs::write(&file_path, &contents).await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to store upload {filename}: {err}"),
        )
            .into_response();
    }

    let transfer_time = start_time.elapsed().as_secs_f64();
    let size = contents.len() as u64;
    #[allow(clippy::cast_precision_loss)]
    let throughput = if transfer_time > 0.0 { size as f64 / transfer_time } else { 0.0 };

    info!(target: "FILE SERVER", "received file {filename} ({size} bytes) in {transfer_time:.4}s");

    Json(UploadReceipt {
        filename,
        size,
        transfer_time,
        throughput,
    })
    .into_response()
}

/// It lists the available files.
pub async fn list_files(State(store): State<Arc<FileStore>>) -> Json<FileList> {
    let mut files = Vec::new();

    if let Ok(mut entries) = tokio::fs::read_dir(&store.files_dir).await {
        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry.file_type().await.is_ok_and(|t| t.is_file()) {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
    }

    files.sort();

    Json(FileList { files })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use tempfile::TempDir;

    use super::{get_file, list_files};
    use crate::servers::file::FileStore;

    fn store_with_file(name: &str, contents: &[u8]) -> (TempDir, Arc<FileStore>) {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(name), contents).unwrap();

        let store = Arc::new(FileStore {
            files_dir: temp.path().to_path_buf(),
            uploads_dir: temp.path().to_path_buf(),
        });

        (temp, store)
    }

    #[tokio::test]
    async fn it_should_serve_an_existing_file() {
        let (_temp, store) = store_with_file("A_10kB", b"0123456789");

        let response = get_file(State(store), Path("A_10kB".to_owned())).await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn it_should_respond_not_found_for_a_missing_file() {
        let (_temp, store) = store_with_file("A_10kB", b"0123456789");

        let response = get_file(State(store), Path("missing".to_owned())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn it_should_list_the_available_files() {
        let (_temp, store) = store_with_file("A_10kB", b"0123456789");

        let list = list_files(State(store)).await.0;

        assert_eq!(list.files, vec!["A_10kB".to_owned()]);
    }

    #[tokio::test]
    async fn the_file_list_should_be_empty_when_the_files_dir_does_not_exist() {
        let store = Arc::new(FileStore::new("./does-not-exist", "./does-not-exist"));

        let list = list_files(State(store)).await.0;

        assert!(list.files.is_empty());
    }
}
