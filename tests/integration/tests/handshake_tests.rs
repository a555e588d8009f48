//! Handshake and heartbeat tests
//!
//! Run with: cargo test -p integration-tests --test handshake_tests

use std::time::{Duration, Instant};

use integration_tests::{ready, MockGateway, Received, TestClient};
use pearl_gateway::SessionStatus;
use serde_json::json;

#[tokio::test]
async fn test_identify_on_hello() {
    let mut gateway = MockGateway::start().await.unwrap();
    let client = TestClient::spawn(&gateway);
    let mut conn = gateway.accept().await.unwrap();

    conn.hello(30_000).await.unwrap();

    let identify = conn.recv().await.unwrap();
    let Received::Json(identify) = identify else {
        panic!("expected IDENTIFY, got {identify:?}");
    };
    assert_eq!(identify["op"], 2);
    assert_eq!(identify["d"]["token"], "integration-token");
    assert_eq!(identify["d"]["compress"], false);
    assert_eq!(identify["d"]["properties"]["$os"], "linux");
    assert_eq!(identify["d"]["properties"]["$browser"], "pearl");

    // Beating starts right after the handshake
    assert_eq!(conn.recv().await.unwrap(), Received::Json(json!({"op": 1, "d": 0})));

    conn.dispatch("READY", 1, ready("session-a")).await.unwrap();
    client.wait_for_status(SessionStatus::Active).await.unwrap();
    assert_eq!(client.client.session().session_id().as_deref(), Some("session-a"));

    client.shutdown().await.unwrap().unwrap();
    assert_eq!(conn.recv_close().await.unwrap(), Some(1000));
}

#[tokio::test]
async fn test_heartbeat_every_interval_with_sequence() {
    let mut gateway = MockGateway::start().await.unwrap();
    let client = TestClient::spawn(&gateway);
    let mut conn = gateway.accept().await.unwrap();

    conn.hello(300).await.unwrap();
    conn.recv_op(2).await.unwrap();
    let first = conn.recv_op(1).await.unwrap();
    let started = Instant::now();
    assert_eq!(first["d"], 0);
    conn.ack().await.unwrap();

    conn.dispatch("READY", 1, ready("session-b")).await.unwrap();
    conn.dispatch("TYPING_START", 2, json!({})).await.unwrap();

    let second = conn.recv_op(1).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(250));
    assert_eq!(second["d"], 2);
    conn.ack().await.unwrap();

    let third = conn.recv_op(1).await.unwrap();
    assert_eq!(third["d"], 2);
    conn.ack().await.unwrap();

    assert_eq!(client.status(), SessionStatus::Active);
    client.shutdown().await.unwrap().unwrap();
}

#[tokio::test]
async fn test_server_heartbeat_request_answered() {
    let mut gateway = MockGateway::start().await.unwrap();
    let client = TestClient::spawn(&gateway);
    let mut conn = gateway.accept().await.unwrap();

    conn.hello(30_000).await.unwrap();
    conn.recv_op(2).await.unwrap();
    conn.recv_op(1).await.unwrap();
    conn.ack().await.unwrap();

    conn.dispatch("READY", 1, ready("session-c")).await.unwrap();
    client.wait_for_status(SessionStatus::Active).await.unwrap();

    conn.send_json(json!({"op": 1, "d": null})).await.unwrap();
    let reply = conn.recv_op(1).await.unwrap();
    assert_eq!(reply["d"], 1);

    client.shutdown().await.unwrap().unwrap();
}

#[tokio::test]
async fn test_malformed_frames_are_skipped() {
    let mut gateway = MockGateway::start().await.unwrap();
    let client = TestClient::spawn(&gateway);
    let mut conn = gateway.accept().await.unwrap();

    conn.send_json(json!({"op": 42})).await.unwrap();
    conn.send_json(json!({"op": 0, "d": {}})).await.unwrap();
    conn.hello(30_000).await.unwrap();
    conn.recv_op(2).await.unwrap();

    conn.dispatch("READY", 1, ready("session-d")).await.unwrap();
    client.wait_for_status(SessionStatus::Active).await.unwrap();
    assert_eq!(client.client.session().last_sequence(), 1);

    client.shutdown().await.unwrap().unwrap();
}
