//! Axum [`handler`](axum#handlers) for the `health_check` endpoint.
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Report {
    pub status: Status,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Status {
    Ok,
}

#[allow(clippy::unused_async)]
pub async fn handler() -> Json<Report> {
    Json(Report { status: Status::Ok })
}
