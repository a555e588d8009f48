//! Channel entity - a guild text/voice channel, category, or DM

use serde::{Deserialize, Serialize};

use super::nullable;
use crate::value_objects::Snowflake;

/// Channel type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "u8", into = "u8")]
pub enum ChannelType {
    /// Guild text channel
    #[default]
    GuildText,
    /// Direct message between users
    Dm,
    /// Guild voice channel
    GuildVoice,
    /// Group direct message
    GroupDm,
    /// Guild category for organizing channels
    GuildCategory,
    /// Any kind this client does not model
    Other(u8),
}

impl ChannelType {
    /// Get the numeric value
    #[inline]
    #[must_use]
    pub fn as_u8(self) -> u8 {
        u8::from(self)
    }

    /// Whether channels of this kind have a name and a position in the guild
    #[inline]
    #[must_use]
    pub fn is_guild_placed(self) -> bool {
        !matches!(self, Self::Dm)
    }
}

impl From<u8> for ChannelType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::GuildText,
            1 => Self::Dm,
            2 => Self::GuildVoice,
            3 => Self::GroupDm,
            4 => Self::GuildCategory,
            other => Self::Other(other),
        }
    }
}

impl From<ChannelType> for u8 {
    fn from(ct: ChannelType) -> Self {
        match ct {
            ChannelType::GuildText => 0,
            ChannelType::Dm => 1,
            ChannelType::GuildVoice => 2,
            ChannelType::GroupDm => 3,
            ChannelType::GuildCategory => 4,
            ChannelType::Other(value) => value,
        }
    }
}

/// Wire shape of a channel before kind-specific fields are filtered
#[derive(Debug, Deserialize)]
struct RawChannel {
    #[serde(default, deserialize_with = "nullable")]
    id: Snowflake,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    kind: u8,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    position: Option<i32>,
    #[serde(default)]
    bitrate: Option<u32>,
    #[serde(default)]
    user_limit: Option<u32>,
}

/// Channel object from GUILD_CREATE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawChannel")]
pub struct Channel {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: ChannelType,
    pub name: Option<String>,
    pub position: i32,
    /// Voice channels only
    pub bitrate: Option<u32>,
    /// Voice channels and categories only
    pub user_limit: Option<u32>,
}

impl From<RawChannel> for Channel {
    fn from(raw: RawChannel) -> Self {
        let kind = ChannelType::from(raw.kind);
        let (name, position) = if kind.is_guild_placed() {
            (raw.name, raw.position.unwrap_or_default())
        } else {
            (None, 0)
        };

        let (bitrate, user_limit) = match kind {
            ChannelType::GuildVoice => (raw.bitrate, raw.user_limit),
            ChannelType::GuildCategory => (None, raw.user_limit),
            _ => (None, None),
        };

        Self {
            id: raw.id,
            kind,
            name,
            position,
            bitrate,
            user_limit,
        }
    }
}

impl Channel {
    /// Check if this is a text channel messages can be posted to
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, ChannelType::GuildText | ChannelType::Dm)
    }
}
