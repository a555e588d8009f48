//! Gateway event types
//!
//! Event names carried in the `t` field of dispatch payloads.

use std::fmt;

/// Dispatch events the client handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayEventType {
    /// Sent after a successful Identify
    Ready,
    /// Sent after a successful Resume
    Resumed,
    /// Guild available, joined, or created
    GuildCreate,
    /// A page of guild members, in answer to Request Guild Members
    GuildMembersChunk,
    /// New message
    MessageCreate,
}

impl GatewayEventType {
    /// Every handled event type
    pub const ALL: [Self; 5] = [
        Self::Ready,
        Self::Resumed,
        Self::GuildCreate,
        Self::GuildMembersChunk,
        Self::MessageCreate,
    ];

    /// Get the wire name of the event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Resumed => "RESUMED",
            Self::GuildCreate => "GUILD_CREATE",
            Self::GuildMembersChunk => "GUILD_MEMBERS_CHUNK",
            Self::MessageCreate => "MESSAGE_CREATE",
        }
    }

    /// Other names the same event has been sent under
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::GuildMembersChunk => &["GUILD_MEMBER_CHUNK"],
            _ => &[],
        }
    }

    /// Parse an event type from its wire name or an alias
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s || event.aliases().contains(&s))
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
