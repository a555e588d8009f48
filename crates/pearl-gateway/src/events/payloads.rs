//! Event payload definitions
//!
//! Only the fields the handlers read are modelled; everything else in the
//! event body is ignored.

use pearl_core::entities::{lenient_u64, nullable};
use pearl_core::{Channel, Member, Role, Snowflake, User};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// READY event payload
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyEvent {
    /// Session ID for resuming
    pub session_id: String,

    /// Guilds the bot is in (initially unavailable)
    #[serde(default, deserialize_with = "nullable")]
    pub guilds: Vec<UnavailableGuild>,

    /// The bot's own user
    #[serde(default)]
    pub user: Option<User>,
}

/// Guild stub in READY
#[derive(Debug, Clone, Deserialize)]
pub struct UnavailableGuild {
    pub id: Snowflake,
    #[serde(default, deserialize_with = "nullable")]
    pub unavailable: bool,
}

/// GUILD_CREATE event payload
///
/// Roles and channels are kept raw; the lists end at the first `null` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildCreateEvent {
    pub id: Snowflake,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub member_count: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub roles: Vec<Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub channels: Vec<Value>,
}

impl GuildCreateEvent {
    pub fn parse_roles(&self) -> Result<Vec<Role>, serde_json::Error> {
        until_null(&self.roles)
    }

    pub fn parse_channels(&self) -> Result<Vec<Channel>, serde_json::Error> {
        until_null(&self.channels)
    }
}

/// GUILD_MEMBERS_CHUNK event payload
#[derive(Debug, Clone, Deserialize)]
pub struct GuildMembersChunkEvent {
    #[serde(alias = "id")]
    pub guild_id: Snowflake,
    #[serde(default, deserialize_with = "nullable")]
    pub members: Vec<Member>,
}

/// MESSAGE_CREATE event payload
#[derive(Debug, Clone, Deserialize)]
pub struct MessageCreateEvent {
    pub channel_id: Snowflake,
    #[serde(default, deserialize_with = "nullable")]
    pub content: String,
    #[serde(alias = "user")]
    pub author: MessageAuthor,
}

/// Author of a message
#[derive(Debug, Clone, Deserialize)]
pub struct MessageAuthor {
    pub id: Snowflake,
    #[serde(default, deserialize_with = "nullable")]
    pub bot: bool,
}

fn until_null<T: DeserializeOwned>(items: &[Value]) -> Result<Vec<T>, serde_json::Error> {
    items
        .iter()
        .take_while(|item| !item.is_null())
        .map(|item| T::deserialize(item))
        .collect()
}
