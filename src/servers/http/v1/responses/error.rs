//! The bencoded `failure reason` response.
//!
//! Trackers report failures inside a `200 OK` response body, not with HTTP
//! status codes. Refer to
//! [BEP 03](https://www.bittorrent.org/beps/bep_0003.html).
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// A bencoded dictionary with a single `failure reason` key.
///
/// ```text
/// d14:failure reason26:cannot resolve the peer IPe
/// ```
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Error {
    #[serde(rename = "failure reason")]
    pub failure_reason: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = serde_bencode::to_bytes(&self).unwrap_or_default();
        (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
    }
}
