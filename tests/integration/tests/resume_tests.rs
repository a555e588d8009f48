//! Reconnect and resume tests
//!
//! Run with: cargo test -p integration-tests --test resume_tests

use integration_tests::{ready, MockGateway, TestClient};
use pearl_gateway::{GatewayError, SessionStatus};
use serde_json::json;

#[tokio::test]
async fn test_resume_after_server_close() {
    let mut gateway = MockGateway::start().await.unwrap();
    let client = TestClient::spawn(&gateway);

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(30_000).await.unwrap();
    conn.recv_op(2).await.unwrap();
    conn.dispatch("READY", 1, ready("session-r")).await.unwrap();
    conn.dispatch("TYPING_START", 2, json!({})).await.unwrap();
    conn.dispatch("TYPING_START", 3, json!({})).await.unwrap();
    client.wait_for_status(SessionStatus::Active).await.unwrap();
    conn.close(4000).await.unwrap();

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(30_000).await.unwrap();
    let resume = conn.recv_control().await.unwrap();
    assert_eq!(resume["op"], 6);
    assert_eq!(resume["d"]["token"], "integration-token");
    assert_eq!(resume["d"]["session_id"], "session-r");
    assert_eq!(resume["d"]["seq"], 3);

    conn.dispatch("RESUMED", 4, json!({})).await.unwrap();
    client.wait_for_status(SessionStatus::Active).await.unwrap();
    assert!(client.client.session().in_sync());

    client.shutdown().await.unwrap().unwrap();
}

#[tokio::test]
async fn test_invalid_session_after_resume_forces_identify() {
    let mut gateway = MockGateway::start().await.unwrap();
    let client = TestClient::spawn(&gateway);

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(30_000).await.unwrap();
    conn.dispatch("READY", 1, ready("session-i")).await.unwrap();
    client.wait_for_status(SessionStatus::Active).await.unwrap();
    conn.close(4000).await.unwrap();

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(30_000).await.unwrap();
    assert_eq!(conn.recv_control().await.unwrap()["op"], 6);
    conn.send_json(json!({"op": 9, "d": false})).await.unwrap();
    assert_eq!(conn.recv_close().await.unwrap(), Some(4000));

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(30_000).await.unwrap();
    let identify = conn.recv_control().await.unwrap();
    assert_eq!(identify["op"], 2);

    conn.dispatch("READY", 1, ready("session-j")).await.unwrap();
    client.wait_for_status(SessionStatus::Active).await.unwrap();
    assert_eq!(client.client.session().session_id().as_deref(), Some("session-j"));
    assert_eq!(client.client.session().last_sequence(), 1);

    client.shutdown().await.unwrap().unwrap();
}

#[tokio::test]
async fn test_missed_ack_reconnects() {
    let mut gateway = MockGateway::start().await.unwrap();
    let client = TestClient::spawn(&gateway);

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(200).await.unwrap();
    conn.dispatch("READY", 1, ready("session-m")).await.unwrap();
    client.wait_for_status(SessionStatus::Active).await.unwrap();

    // No ACKs: the client gives up on this connection
    assert_eq!(conn.recv_close().await.unwrap(), Some(4000));

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(30_000).await.unwrap();
    assert_eq!(conn.recv_control().await.unwrap()["op"], 2);

    client.shutdown().await.unwrap().unwrap();
}

#[tokio::test]
async fn test_reconnect_request() {
    let mut gateway = MockGateway::start().await.unwrap();
    let client = TestClient::spawn(&gateway);

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(30_000).await.unwrap();
    conn.dispatch("READY", 1, ready("session-x")).await.unwrap();
    client.wait_for_status(SessionStatus::Active).await.unwrap();
    conn.send_json(json!({"op": 7, "d": null})).await.unwrap();
    assert_eq!(conn.recv_close().await.unwrap(), Some(4000));

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(30_000).await.unwrap();
    let resume = conn.recv_control().await.unwrap();
    assert_eq!(resume["op"], 6);
    assert_eq!(resume["d"]["seq"], 1);

    client.shutdown().await.unwrap().unwrap();
}

#[tokio::test]
async fn test_authentication_failure_is_fatal() {
    let mut gateway = MockGateway::start().await.unwrap();
    let client = TestClient::spawn(&gateway);

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(30_000).await.unwrap();
    conn.recv_op(2).await.unwrap();
    conn.close(4004).await.unwrap();

    let result = client.join().await.unwrap();
    assert!(matches!(result, Err(GatewayError::FatalClose(4004))));
    assert!(!gateway.has_pending());
}
