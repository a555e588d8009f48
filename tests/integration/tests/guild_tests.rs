//! Guild mirror tests
//!
//! Run with: cargo test -p integration-tests --test guild_tests

use integration_tests::{guild_create, members_chunk, ready, MockGateway, TestClient, GUILD_ID};
use pearl_core::Snowflake;
use pearl_gateway::SessionStatus;

#[tokio::test]
async fn test_guild_create_requests_members_and_fills_roster() {
    let mut gateway = MockGateway::start().await.unwrap();
    let client = TestClient::spawn(&gateway);

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(30_000).await.unwrap();
    assert_eq!(conn.recv_control().await.unwrap()["op"], 2);
    conn.dispatch("READY", 1, ready("session-g")).await.unwrap();
    conn.dispatch("GUILD_CREATE", 2, guild_create()).await.unwrap();

    let request = conn.recv_control().await.unwrap();
    assert_eq!(request["op"], 8);
    assert_eq!(request["d"]["guild_id"], GUILD_ID.to_string());
    assert_eq!(request["d"]["limit"], 250);
    assert_eq!(request["d"]["query"], "");

    conn.dispatch("GUILD_MEMBERS_CHUNK", 3, members_chunk(&[10, 11, 12]))
        .await
        .unwrap();

    let guild = client.wait_for_guild(|g| g.roster_len() == 3).await.unwrap();
    assert_eq!(guild.id, Snowflake::new(GUILD_ID));
    assert_eq!(guild.roles.len(), 2);
    assert_eq!(guild.channels.len(), 1);
    assert_eq!(guild.member_count, 3);
    assert_eq!(guild.user(Snowflake::new(11)).map(|u| u.username.as_str()), Some("user11"));

    client.shutdown().await.unwrap().unwrap();
}

#[tokio::test]
async fn test_repeated_chunk_keeps_roster() {
    let mut gateway = MockGateway::start().await.unwrap();
    let client = TestClient::spawn(&gateway);

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(30_000).await.unwrap();
    conn.dispatch("READY", 1, ready("session-h")).await.unwrap();
    conn.dispatch("GUILD_CREATE", 2, guild_create()).await.unwrap();
    conn.dispatch("GUILD_MEMBERS_CHUNK", 3, members_chunk(&[10, 11])).await.unwrap();
    conn.dispatch("GUILD_MEMBERS_CHUNK", 4, members_chunk(&[10, 11])).await.unwrap();
    conn.dispatch("GUILD_MEMBER_CHUNK", 5, members_chunk(&[12])).await.unwrap();

    client.wait_for_status(SessionStatus::Active).await.unwrap();
    let guild = client.wait_for_guild(|g| g.roster_len() == 3).await.unwrap();
    assert_eq!(guild.roster_len(), 3);
    assert_eq!(client.client.session().last_sequence(), 5);

    client.shutdown().await.unwrap().unwrap();
}
