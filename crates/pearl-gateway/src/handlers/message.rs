//! MESSAGE_CREATE: turn prefixed messages into commands

use super::{parse, HandlerResult};
use crate::commands::{Command, CommandAction};
use crate::dispatcher::DispatchContext;
use crate::events::MessageCreateEvent;
use serde_json::Value;

pub struct MessageCreateHandler;

impl MessageCreateHandler {
    /// Queue a command for a prefixed message
    ///
    /// Authors outside the allow-list get a `PermissionDenied` entry instead of
    /// their command.
    pub fn handle(ctx: &DispatchContext<'_>, body: &Value) -> HandlerResult<()> {
        let message: MessageCreateEvent = parse("MESSAGE_CREATE", body)?;
        let Some(text) = message.content.strip_prefix(ctx.bot.command_prefix) else {
            return Ok(());
        };

        let action = if ctx.bot.allowed_user_ids.contains(&message.author.id) {
            let mut tokens = text.split_whitespace();
            let Some(name) = tokens.next() else {
                tracing::debug!(channel_id = %message.channel_id, "Empty command ignored");
                return Ok(());
            };
            CommandAction::Run {
                name: name.to_string(),
                args: tokens.map(str::to_string).collect(),
            }
        } else {
            tracing::info!(author_id = %message.author.id, "Command from author not on allow-list");
            CommandAction::PermissionDenied
        };

        let command = Command {
            channel_id: message.channel_id,
            author_id: message.author.id,
            action,
        };
        tracing::debug!(command = ?command, "Command queued");
        ctx.commands.push(command)?;
        Ok(())
    }
}
