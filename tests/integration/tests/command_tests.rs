//! Command handoff tests
//!
//! Run with: cargo test -p integration-tests --test command_tests

use std::sync::Arc;

use integration_tests::{message_create, ready, MockGateway, TestClient, ALLOWED_USER, CHANNEL_ID, OTHER_USER, WAIT};
use pearl_core::Snowflake;
use pearl_gateway::{CommandAction, SessionStatus};
use tokio::time::timeout;

#[tokio::test]
async fn test_allowed_and_denied_commands() {
    let mut gateway = MockGateway::start().await.unwrap();
    let mut client = TestClient::spawn(&gateway);

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(30_000).await.unwrap();
    conn.dispatch("READY", 1, ready("session-c")).await.unwrap();
    conn.dispatch("MESSAGE_CREATE", 2, message_create(ALLOWED_USER, "!ping"))
        .await
        .unwrap();
    conn.dispatch("MESSAGE_CREATE", 3, message_create(OTHER_USER, "!ping"))
        .await
        .unwrap();
    conn.dispatch("MESSAGE_CREATE", 4, message_create(ALLOWED_USER, "just chatting"))
        .await
        .unwrap();
    client.wait_for_status(SessionStatus::Active).await.unwrap();

    let allowed = timeout(WAIT, client.commands.recv()).await.unwrap().unwrap();
    assert_eq!(allowed.channel_id, Snowflake::new(CHANNEL_ID));
    assert_eq!(allowed.name(), Some("ping"));

    let denied = timeout(WAIT, client.commands.recv()).await.unwrap().unwrap();
    assert_eq!(denied.action, CommandAction::PermissionDenied);
    assert_eq!(denied.author_id, Snowflake::new(OTHER_USER));

    client.shutdown().await.unwrap().unwrap();
}

#[tokio::test]
async fn test_bot_replies_through_rest() {
    let mut gateway = MockGateway::start().await.unwrap();
    let TestClient {
        client,
        rest,
        commands,
        ..
    } = TestClient::spawn(&gateway);
    let consumer = tokio::spawn(pearl_bot::consume_commands(commands, Arc::clone(&rest), '!'));

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(30_000).await.unwrap();
    conn.dispatch("READY", 1, ready("session-e")).await.unwrap();
    conn.dispatch("MESSAGE_CREATE", 2, message_create(ALLOWED_USER, "!echo hi there"))
        .await
        .unwrap();
    conn.dispatch("MESSAGE_CREATE", 3, message_create(OTHER_USER, "!ping"))
        .await
        .unwrap();

    let deadline = tokio::time::Instant::now() + WAIT;
    while rest.posted().len() < 2 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(
        rest.posted(),
        vec![
            (Snowflake::new(CHANNEL_ID), "hi there".to_string()),
            (Snowflake::new(CHANNEL_ID), "Permission Denied".to_string()),
        ]
    );

    client.shutdown_handle().shutdown();
    consumer.abort();
}
