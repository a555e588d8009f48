//! Guild state handlers

use super::{parse, HandlerError, HandlerResult};
use crate::dispatcher::DispatchContext;
use crate::events::{GuildCreateEvent, GuildMembersChunkEvent};
use crate::protocol::{OpCode, Payload};
use pearl_core::CoreError;
use serde_json::Value;

/// GUILD_CREATE: replace roles and channels, then ask for the member list
pub struct GuildCreateHandler;

impl GuildCreateHandler {
    pub fn handle(ctx: &DispatchContext<'_>, body: &Value) -> HandlerResult<()> {
        let event: GuildCreateEvent = parse("GUILD_CREATE", body)?;
        let malformed = |source| HandlerError::Malformed {
            event: "GUILD_CREATE",
            source,
        };
        let roles = event.parse_roles().map_err(malformed)?;
        let channels = event.parse_channels().map_err(malformed)?;

        if ctx.guild.guild_id().is_none() {
            ctx.guild.track(event.id);
            ctx.session.set_guild_id(event.id);
        }

        let (role_count, channel_count) = ctx
            .guild
            .with_guild(|guild| -> Result<_, CoreError> {
                guild.ensure_same(event.id)?;
                guild.member_count = event.member_count;
                guild.roles = roles;
                guild.channels = channels;
                Ok((guild.roles.len(), guild.channels.len()))
            })
            .ok_or(HandlerError::NoGuild)??;

        ctx.outbound.enqueue(Payload::control(OpCode::RequestGuildMembers));

        tracing::info!(
            guild_id = %event.id,
            member_count = event.member_count,
            roles = role_count,
            channels = channel_count,
            "Guild created"
        );
        Ok(())
    }
}

/// GUILD_MEMBERS_CHUNK: upsert each member's user into the roster
pub struct MembersChunkHandler;

impl MembersChunkHandler {
    pub fn handle(ctx: &DispatchContext<'_>, body: &Value) -> HandlerResult<()> {
        let chunk: GuildMembersChunkEvent = parse("GUILD_MEMBERS_CHUNK", body)?;
        let guild_id = chunk.guild_id;

        let (added, roster) = ctx
            .guild
            .with_guild(|guild| -> Result<_, CoreError> {
                guild.ensure_same(guild_id)?;
                let mut added = 0;
                for member in chunk.members {
                    if guild.upsert_user(member.user) {
                        added += 1;
                    }
                }
                Ok((added, guild.roster_len()))
            })
            .ok_or(HandlerError::NoGuild)??;

        tracing::debug!(guild_id = %guild_id, added, roster, "Member chunk applied");
        Ok(())
    }
}
