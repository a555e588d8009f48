//! Role entity - a guild role

use serde::{Deserialize, Serialize};

use super::{lenient_u64, nullable};
use crate::value_objects::Snowflake;

/// Role object from GUILD_CREATE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(default, deserialize_with = "nullable")]
    pub id: Snowflake,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub color: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub hoist: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub position: i32,
    /// Raw permission bits; sent as a number or a decimal string
    #[serde(default, deserialize_with = "lenient_u64")]
    pub permissions: u64,
    #[serde(default, deserialize_with = "nullable")]
    pub managed: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub mentionable: bool,
}

impl Role {
    /// Check whether every bit of `mask` is granted
    #[inline]
    pub fn has_permission_bits(&self, mask: u64) -> bool {
        self.permissions & mask == mask
    }

    /// The @everyone role shares its id with the guild
    #[inline]
    pub fn is_everyone(&self, guild_id: Snowflake) -> bool {
        self.id == guild_id
    }
}
