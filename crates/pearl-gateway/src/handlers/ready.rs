//! READY and RESUMED

use super::{parse, HandlerResult};
use crate::dispatcher::DispatchContext;
use crate::events::ReadyEvent;
use crate::session::SessionStatus;
use serde_json::Value;

pub struct ReadyHandler;

impl ReadyHandler {
    pub fn handle(ctx: &DispatchContext<'_>, body: &Value) -> HandlerResult<()> {
        let ready: ReadyEvent = parse("READY", body)?;

        ctx.session.set_session_id(ready.session_id.as_str());
        match ready.guilds.first() {
            Some(guild) => {
                ctx.session.set_guild_id(guild.id);
                ctx.guild.track(guild.id);
            }
            None => tracing::warn!("READY listed no guilds"),
        }
        ctx.session.set_in_sync(true);
        ctx.session.transition_to(SessionStatus::Active);

        tracing::info!(
            session_id = %ready.session_id,
            guild_id = ?ctx.session.guild_id(),
            user = ?ready.user.as_ref().map(|u| u.tag()),
            "Session ready"
        );
        Ok(())
    }
}

pub struct ResumedHandler;

impl ResumedHandler {
    pub fn handle(ctx: &DispatchContext<'_>, _body: &Value) -> HandlerResult<()> {
        ctx.session.set_in_sync(true);
        ctx.session.transition_to(SessionStatus::Active);
        tracing::info!(seq = ctx.session.last_sequence(), "Session resumed");
        Ok(())
    }
}
