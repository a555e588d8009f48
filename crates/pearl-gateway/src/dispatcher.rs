//! Event dispatcher
//!
//! Two lookup tables: control handlers keyed by op code, event handlers keyed
//! by dispatch event name. Every DISPATCH counts towards `last_sequence` before
//! it is routed; unknown events fall through to a no-op.

use crate::cache::GuildCache;
use crate::commands::CommandSender;
use crate::events::GatewayEventType;
use crate::handlers::control::{
    HeartbeatAckHandler, HeartbeatRequestHandler, HelloHandler, InvalidSessionHandler, ReconnectHandler,
};
use crate::handlers::guild::{GuildCreateHandler, MembersChunkHandler};
use crate::handlers::message::MessageCreateHandler;
use crate::handlers::ready::{ReadyHandler, ResumedHandler};
use crate::handlers::HandlerResult;
use crate::heartbeat::HeartbeatMonitor;
use crate::outbound::OutboundQueue;
use crate::protocol::{OpCode, Payload};
use crate::session::Session;
use pearl_common::BotConfig;
use serde_json::Value;
use std::collections::HashMap;

/// Everything a handler may touch
#[derive(Clone, Copy)]
pub struct DispatchContext<'a> {
    pub session: &'a Session,
    pub heartbeat: &'a HeartbeatMonitor,
    pub outbound: &'a OutboundQueue,
    pub guild: &'a GuildCache,
    pub commands: &'a CommandSender,
    pub bot: &'a BotConfig,
}

/// Handler for a non-dispatch op
pub type ControlHandler = fn(&DispatchContext<'_>, &Payload) -> HandlerResult<()>;

/// Handler for a named dispatch event, given the event body
pub type EventHandler = fn(&DispatchContext<'_>, &Value) -> HandlerResult<()>;

/// Routes decoded payloads to handlers
#[derive(Clone)]
pub struct EventDispatcher {
    control: HashMap<OpCode, ControlHandler>,
    events: HashMap<String, EventHandler>,
}

impl EventDispatcher {
    /// Dispatcher with every built-in handler registered
    #[must_use]
    pub fn new() -> Self {
        let mut dispatcher = Self::empty();

        dispatcher.on_op(OpCode::Hello, HelloHandler::handle);
        dispatcher.on_op(OpCode::Heartbeat, HeartbeatRequestHandler::handle);
        dispatcher.on_op(OpCode::HeartbeatAck, HeartbeatAckHandler::handle);
        dispatcher.on_op(OpCode::InvalidSession, InvalidSessionHandler::handle);
        dispatcher.on_op(OpCode::Reconnect, ReconnectHandler::handle);

        dispatcher.on_event(GatewayEventType::Ready, ReadyHandler::handle);
        dispatcher.on_event(GatewayEventType::Resumed, ResumedHandler::handle);
        dispatcher.on_event(GatewayEventType::GuildCreate, GuildCreateHandler::handle);
        dispatcher.on_event(GatewayEventType::GuildMembersChunk, MembersChunkHandler::handle);
        dispatcher.on_event(GatewayEventType::MessageCreate, MessageCreateHandler::handle);

        dispatcher
    }

    /// Dispatcher with no handlers; every payload is a no-op
    #[must_use]
    pub fn empty() -> Self {
        Self {
            control: HashMap::new(),
            events: HashMap::new(),
        }
    }

    /// Register (or replace) the handler for an op code
    pub fn on_op(&mut self, op: OpCode, handler: ControlHandler) {
        self.control.insert(op, handler);
    }

    /// Register (or replace) the handler for an event, under its name and aliases
    pub fn on_event(&mut self, event: GatewayEventType, handler: EventHandler) {
        self.events.insert(event.as_str().to_string(), handler);
        for alias in event.aliases() {
            self.events.insert((*alias).to_string(), handler);
        }
    }

    /// Register a handler for an event name with no built-in type
    pub fn on_event_name(&mut self, name: impl Into<String>, handler: EventHandler) {
        self.events.insert(name.into(), handler);
    }

    /// Route one inbound payload
    ///
    /// Runs to completion before the next payload is read, so each handler's
    /// mutations land as a unit.
    pub fn dispatch(&self, ctx: &DispatchContext<'_>, payload: &Payload) -> HandlerResult<()> {
        if payload.op != OpCode::Dispatch {
            return match self.control.get(&payload.op) {
                Some(handler) => handler(ctx, payload),
                None => {
                    tracing::trace!(op = %payload.op, "No handler for op");
                    Ok(())
                }
            };
        }

        let sequence = ctx.session.record_dispatch();
        if let Some(server_seq) = payload.s {
            if server_seq != sequence {
                tracing::debug!(local = sequence, server = server_seq, "Sequence differs from server");
            }
        }

        let event = payload.event_name().unwrap_or_default();
        tracing::trace!(event, sequence, "Dispatch received");
        match self.events.get(event) {
            Some(handler) => handler(ctx, &payload.d),
            None => {
                tracing::trace!(event, "Ignoring unhandled event");
                Ok(())
            }
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut events: Vec<_> = self.events.keys().collect();
        events.sort();
        f.debug_struct("EventDispatcher")
            .field("ops", &self.control.len())
            .field("events", &events)
            .finish()
    }
}
