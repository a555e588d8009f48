//! Bot wiring
//!
//! Runs the gateway client and the command consumer side by side. Ctrl-C moves
//! the session to TERMINATING; once the client returns, the command queue
//! closes and the consumer drains what is left.

use crate::interpreter::interpret;
use crate::rest::RestClient;
use pearl_common::{AppConfig, AppError, AppResult};
use pearl_gateway::{command_channel, CommandReceiver, GatewayClient, RestApi, WsConnector};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Run the bot until shutdown or a fatal gateway error
pub async fn run(config: AppConfig) -> AppResult<()> {
    let rest = Arc::new(RestClient::new(&config.rest, &config.gateway.token).map_err(AppError::rest)?);
    let prefix = config.bot.command_prefix;
    let (commands, receiver) = command_channel();

    let client = Arc::new(GatewayClient::new(
        config.gateway,
        config.bot,
        WsConnector,
        Arc::clone(&rest),
        commands,
    ));

    let shutdown = client.shutdown_handle();
    let signal = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                shutdown.shutdown();
            }
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    let consumer = tokio::spawn(consume_commands(receiver, Arc::clone(&rest), prefix));

    let gateway = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.run().await })
    };
    let result = gateway.await.map_err(AppError::internal)?;

    signal.abort();
    // Dropping the client drops the last command sender
    drop(client);
    if let Err(e) = consumer.await {
        warn!(error = %e, "Command consumer ended abnormally");
    }

    info!("Pearl bot stopped");
    result.map_err(AppError::gateway)
}

/// Answer commands until the queue closes
///
/// Each command gets exactly one reply in its channel; failed posts are logged
/// and skipped.
pub async fn consume_commands<R: RestApi>(mut receiver: CommandReceiver, rest: Arc<R>, prefix: char) {
    while let Some(command) = receiver.recv().await {
        let reply = interpret(&command, prefix);
        tracing::debug!(
            channel_id = %command.channel_id,
            command = command.name().unwrap_or("<denied>"),
            "Answering command"
        );
        if let Err(e) = rest.create_message(command.channel_id, &reply).await {
            warn!(error = %e, channel_id = %command.channel_id, "Failed to post reply");
        }
    }
    tracing::debug!("Command queue closed");
}
