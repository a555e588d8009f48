//! Test fixtures and payload builders
//!
//! Provides the ids and event bodies the integration tests script.

use pearl_common::BotConfig;
use pearl_core::Snowflake;
use serde_json::{json, Value};

pub const GUILD_ID: u64 = 41_771_983_423_143_937;
pub const CHANNEL_ID: u64 = 41_771_983_423_143_940;
pub const ALLOWED_USER: u64 = 80_351_110_224_678_912;
pub const OTHER_USER: u64 = 80_351_110_224_678_999;

/// Allow-list with a single user and the `!` prefix
pub fn bot_config() -> BotConfig {
    BotConfig {
        command_prefix: '!',
        allowed_user_ids: vec![Snowflake::new(ALLOWED_USER)],
    }
}

pub fn ready(session_id: &str) -> Value {
    json!({
        "v": 6,
        "session_id": session_id,
        "user": {"id": "5", "username": "pearl", "discriminator": "0001", "bot": true},
        "guilds": [{"id": GUILD_ID.to_string(), "unavailable": true}]
    })
}

/// GUILD_CREATE with two roles and one text channel
pub fn guild_create() -> Value {
    json!({
        "id": GUILD_ID.to_string(),
        "name": "Pearl Test",
        "member_count": 3,
        "roles": [
            {"id": GUILD_ID.to_string(), "name": "@everyone", "permissions": 104_324_161, "position": 0},
            {"id": "41771983423143938", "name": "mods", "color": 3_447_003, "hoist": true, "position": 1}
        ],
        "channels": [
            {"id": CHANNEL_ID.to_string(), "type": 0, "name": "general", "position": 0, "topic": null}
        ]
    })
}

/// GUILD_MEMBERS_CHUNK for users `ids`
pub fn members_chunk(ids: &[u64]) -> Value {
    let members: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "user": {"id": id.to_string(), "username": format!("user{id}"), "discriminator": "0001"},
                "roles": [],
                "joined_at": "2015-04-26T06:26:56.936000+00:00",
                "deaf": false,
                "mute": false
            })
        })
        .collect();
    json!({"guild_id": GUILD_ID.to_string(), "members": members})
}

pub fn message_create(author: u64, content: &str) -> Value {
    json!({
        "id": "1",
        "channel_id": CHANNEL_ID.to_string(),
        "content": content,
        "author": {"id": author.to_string(), "username": "someone", "discriminator": "1234"}
    })
}
