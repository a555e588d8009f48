//! User entity - a platform account as seen through the gateway

use serde::{Deserialize, Serialize};

use super::nullable;
use crate::value_objects::Snowflake;

/// User object carried by READY, MESSAGE_CREATE and member chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "nullable")]
    pub id: Snowflake,
    #[serde(default, deserialize_with = "nullable")]
    pub username: String,
    #[serde(default, deserialize_with = "nullable")]
    pub discriminator: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub bot: bool,
}

impl User {
    /// Create a user with just an id and name
    pub fn new(id: Snowflake, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            discriminator: "0000".to_string(),
            avatar: None,
            bot: false,
        }
    }

    /// Get the full tag: username#discriminator
    pub fn tag(&self) -> String {
        format!("{}#{}", self.username, self.discriminator)
    }
}
