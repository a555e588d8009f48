//! Control-plane handlers (HELLO, HEARTBEAT, HEARTBEAT_ACK, INVALID_SESSION, RECONNECT)

use super::{parse, HandlerResult};
use crate::dispatcher::DispatchContext;
use crate::protocol::{HelloPayload, OpCode, Payload};
use crate::session::SessionStatus;

/// HELLO: send IDENTIFY or RESUME, then start beating
pub struct HelloHandler;

impl HelloHandler {
    pub fn handle(ctx: &DispatchContext<'_>, payload: &Payload) -> HandlerResult<()> {
        let hello: HelloPayload = parse("HELLO", &payload.d)?;

        if ctx.session.can_resume() {
            tracing::info!(
                seq = ctx.session.last_sequence(),
                "Resuming session"
            );
            ctx.outbound.enqueue(Payload::control(OpCode::Resume));
        } else {
            ctx.session.begin_fresh_session();
            tracing::info!("Identifying new session");
            ctx.outbound.enqueue(Payload::control(OpCode::Identify));
        }

        // Queued after the handshake so it never goes out ahead of it
        ctx.heartbeat.start(hello.heartbeat_interval);
        Ok(())
    }
}

/// HEARTBEAT from the server: beat now unless one is outstanding
pub struct HeartbeatRequestHandler;

impl HeartbeatRequestHandler {
    pub fn handle(ctx: &DispatchContext<'_>, _payload: &Payload) -> HandlerResult<()> {
        ctx.heartbeat.request_beat(ctx.session, ctx.outbound);
        Ok(())
    }
}

pub struct HeartbeatAckHandler;

impl HeartbeatAckHandler {
    pub fn handle(ctx: &DispatchContext<'_>, _payload: &Payload) -> HandlerResult<()> {
        ctx.heartbeat.ack();
        tracing::trace!("Heartbeat acknowledged");
        Ok(())
    }
}

/// INVALID_SESSION: the next HELLO must identify
pub struct InvalidSessionHandler;

impl InvalidSessionHandler {
    pub fn handle(ctx: &DispatchContext<'_>, payload: &Payload) -> HandlerResult<()> {
        tracing::warn!(
            resumable = payload.d.as_bool().unwrap_or(false),
            "Session invalidated by server"
        );
        ctx.session.set_in_sync(false);
        ctx.session.transition_to(SessionStatus::Disconnected);
        Ok(())
    }
}

/// RECONNECT: drop the connection and resume on a new one
pub struct ReconnectHandler;

impl ReconnectHandler {
    pub fn handle(ctx: &DispatchContext<'_>, _payload: &Payload) -> HandlerResult<()> {
        tracing::info!("Server requested reconnect");
        ctx.session.transition_to(SessionStatus::Disconnected);
        Ok(())
    }
}
