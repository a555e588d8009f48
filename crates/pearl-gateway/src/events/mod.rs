//! Gateway events
//!
//! Names and bodies of the dispatch events the client acts on.

mod event_types;
mod payloads;

pub use event_types::GatewayEventType;
pub use payloads::{
    GuildCreateEvent, GuildMembersChunkEvent, MessageAuthor, MessageCreateEvent, ReadyEvent,
    UnavailableGuild,
};
