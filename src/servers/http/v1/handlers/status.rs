//! Axum [`handler`](axum#handlers) for the `/` status page.
//!
//! A human-readable summary of the active torrent count and total peer
//! count. Diagnostic only, no contract guarantees.
use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;

use crate::core::Tracker;

#[allow(clippy::unused_async)]
pub async fn handler(State(tracker): State<Arc<Tracker>>) -> Html<String> {
    let metrics = tracker.get_metrics();

    Html(format!(
        "<h1>BitTorrent Tracker</h1><p>Active torrents: {}</p><p>Active peers: {}</p>",
        metrics.torrents,
        metrics.peers()
    ))
}
