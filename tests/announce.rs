//! Integration tests for the announce service.
//!
//! They boot the service on an ephemeral port and drive it with a plain
//! HTTP client, decoding the bencoded responses.
use std::net::SocketAddr;
use std::sync::Arc;

use transfer_bench::core::Tracker;
use transfer_bench::servers::http::v1::launcher;
use transfer_bench::servers::http::v1::responses::announce::Announce;
use transfer_bench_test_helpers::configuration::ephemeral;

const SAMPLE_INFO_HASH: &str = "%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0";

async fn start_announce_service() -> SocketAddr {
    let cfg = ephemeral();
    let tracker = Arc::new(Tracker::new(&cfg));

    let bind_to = cfg.tracker.bind_address.parse().expect("a valid bind address");

    let (addr, _handle) = launcher::start_with_graceful_shutdown(bind_to, tracker, std::future::pending())
        .await
        .expect("the announce service should start");

    addr
}

async fn announce(addr: &SocketAddr, query: &str) -> Announce {
    let response = reqwest::get(format!("http://{addr}/announce?{query}"))
        .await
        .expect("the announce request should succeed");

    assert_eq!(response.status(), 200);

    let body = response.bytes().await.expect("the response should have a body");

    serde_bencode::from_bytes(&body).expect("the response should be a bencoded dictionary")
}

#[tokio::test]
async fn the_first_peer_in_a_swarm_should_get_an_empty_compact_peer_list() {
    let addr = start_announce_service().await;

    let response = announce(
        &addr,
        &format!("info_hash={SAMPLE_INFO_HASH}&peer_id=-qB00000000000000001&port=17548&left=0"),
    )
    .await;

    assert_eq!(response.interval, 60);
    assert_eq!(response.min_interval, 30);
    // The requester is a seeder (left=0) and must not receive itself.
    assert_eq!(response.complete, 1);
    assert_eq!(response.incomplete, 0);
    assert!(response.peers.is_empty());
}

#[tokio::test]
async fn a_second_peer_should_receive_the_first_one_in_the_compact_peer_list() {
    let addr = start_announce_service().await;

    announce(
        &addr,
        &format!("info_hash={SAMPLE_INFO_HASH}&peer_id=-qB00000000000000001&port=17548&left=0"),
    )
    .await;

    let response = announce(
        &addr,
        &format!("info_hash={SAMPLE_INFO_HASH}&peer_id=-qB00000000000000002&port=17549&left=100"),
    )
    .await;

    assert_eq!(response.complete, 1);
    assert_eq!(response.incomplete, 1);

    let peers = response.peer_addrs();
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].port(), 17548);
    assert!(peers[0].ip().is_loopback());
}

#[tokio::test]
async fn an_announce_without_parameters_should_still_succeed() {
    let addr = start_announce_service().await;

    // Permissive parsing: everything defaults instead of failing.
    let response = announce(&addr, "").await;

    assert_eq!(response.interval, 60);
    assert_eq!(response.complete, 1);
}

#[tokio::test]
async fn the_status_page_should_show_the_swarm_counters() {
    let addr = start_announce_service().await;

    announce(
        &addr,
        &format!("info_hash={SAMPLE_INFO_HASH}&peer_id=-qB00000000000000001&port=17548&left=0"),
    )
    .await;

    let body = reqwest::get(format!("http://{addr}/"))
        .await
        .expect("the status request should succeed")
        .text()
        .await
        .expect("the status page should be text");

    assert!(body.contains("Active torrents: 1"));
    assert!(body.contains("Active peers: 1"));
}

#[tokio::test]
async fn the_health_check_endpoint_should_answer_ok() {
    let addr = start_announce_service().await;

    let response = reqwest::get(format!("http://{addr}/health_check"))
        .await
        .expect("the health check request should succeed");

    assert_eq!(response.status(), 200);
}
