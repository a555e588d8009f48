//! Command handoff queue
//!
//! MESSAGE_CREATE turns chat commands into [`Command`]s and pushes them here;
//! the bot drains them on its own task. The two ends are created together and
//! handed to producer and consumer by ownership.

use pearl_core::Snowflake;
use tokio::sync::mpsc;

/// A chat command addressed to the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Channel the command was typed in; replies go here
    pub channel_id: Snowflake,
    pub author_id: Snowflake,
    pub action: CommandAction,
}

/// What the bot should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    /// Run a named command with its arguments
    Run { name: String, args: Vec<String> },
    /// The author is not on the allow-list
    PermissionDenied,
}

impl Command {
    /// Command name, for allowed commands
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.action {
            CommandAction::Run { name, .. } => Some(name),
            CommandAction::PermissionDenied => None,
        }
    }
}

/// The consumer has gone away
#[derive(Debug, Clone, thiserror::Error)]
#[error("Command queue closed")]
pub struct CommandQueueClosed;

/// Producer end
#[derive(Debug, Clone)]
pub struct CommandSender(mpsc::UnboundedSender<Command>);

/// Consumer end
#[derive(Debug)]
pub struct CommandReceiver(mpsc::UnboundedReceiver<Command>);

/// Create a connected sender/receiver pair
#[must_use]
pub fn command_channel() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CommandSender(tx), CommandReceiver(rx))
}

impl CommandSender {
    /// Append a command; never blocks
    pub fn push(&self, command: Command) -> Result<(), CommandQueueClosed> {
        self.0.send(command).map_err(|_| CommandQueueClosed)
    }
}

impl CommandReceiver {
    /// Wait for the next command; `None` once every sender is dropped
    pub async fn recv(&mut self) -> Option<Command> {
        self.0.recv().await
    }

    /// Take a command if one is ready
    pub fn try_recv(&mut self) -> Option<Command> {
        self.0.try_recv().ok()
    }
}
