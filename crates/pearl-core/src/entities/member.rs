//! Member entity - a user's membership in a guild

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::nullable;
use super::user::User;
use crate::value_objects::Snowflake;

/// Guild member object, as delivered in member chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user: User,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub roles: Vec<Snowflake>,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub deaf: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub mute: bool,
}

impl Member {
    /// Name shown in the guild (nickname, falling back to username)
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.user.username)
    }
}
