//! Guild entity - the single guild this client tracks, with its member roster

use std::collections::HashMap;

use super::{Channel, Role, User};
use crate::error::CoreError;
use crate::value_objects::Snowflake;

/// Local mirror of a guild
///
/// Roles and channels are replaced wholesale by each GUILD_CREATE; the roster is
/// filled incrementally by member chunks and keyed by user id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guild {
    pub id: Snowflake,
    pub member_count: u64,
    pub roles: Vec<Role>,
    pub channels: Vec<Channel>,
    roster: HashMap<Snowflake, User>,
}

impl Guild {
    /// Create an empty guild with a known id
    pub fn new(id: Snowflake) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Check that an event addressed to `guild_id` belongs to this guild
    pub fn ensure_same(&self, guild_id: Snowflake) -> Result<(), CoreError> {
        if self.id == guild_id {
            Ok(())
        } else {
            Err(CoreError::GuildMismatch {
                expected: self.id,
                actual: guild_id,
            })
        }
    }

    /// Insert or replace a user in the roster
    ///
    /// Returns `true` if the user was not present before.
    pub fn upsert_user(&mut self, user: User) -> bool {
        self.roster.insert(user.id, user).is_none()
    }

    /// Remove a user from the roster
    pub fn remove_user(&mut self, user_id: Snowflake) -> Option<User> {
        self.roster.remove(&user_id)
    }

    /// Look up a roster entry
    pub fn user(&self, user_id: Snowflake) -> Option<&User> {
        self.roster.get(&user_id)
    }

    /// Number of users in the roster
    pub fn roster_len(&self) -> usize {
        self.roster.len()
    }

    /// Iterate over the roster
    pub fn roster(&self) -> impl Iterator<Item = &User> {
        self.roster.values()
    }

    /// Find a channel by id
    pub fn channel(&self, channel_id: Snowflake) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == channel_id)
    }

    /// Find a role by id
    pub fn role(&self, role_id: Snowflake) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == role_id)
    }
}
