//! Local guild mirror
//!
//! Holds the one guild the client lives in. Handlers mutate it under a single
//! lock per event, so an event's changes land all at once.

use parking_lot::Mutex;
use pearl_core::{Guild, Snowflake};

#[derive(Debug, Default)]
pub struct GuildCache {
    guild: Mutex<Option<Guild>>,
}

impl GuildCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `guild_id`, keeping existing data if it is already tracked
    pub fn track(&self, guild_id: Snowflake) {
        let mut guild = self.guild.lock();
        if guild.as_ref().is_some_and(|g| g.id == guild_id) {
            return;
        }
        *guild = Some(Guild::new(guild_id));
    }

    /// Run `f` against the tracked guild, if any
    pub fn with_guild<R>(&self, f: impl FnOnce(&mut Guild) -> R) -> Option<R> {
        self.guild.lock().as_mut().map(f)
    }

    /// Copy of the tracked guild
    pub fn snapshot(&self) -> Option<Guild> {
        self.guild.lock().clone()
    }

    pub fn guild_id(&self) -> Option<Snowflake> {
        self.guild.lock().as_ref().map(|g| g.id)
    }
}
