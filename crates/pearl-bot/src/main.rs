//! Pearl bot entry point
//!
//! Run with:
//! ```bash
//! DISCORD_TOKEN=... cargo run -p pearl-bot
//! ```
//!
//! Configuration is loaded from environment variables or a `.env` file.

use pearl_common::{try_init_tracing_with_config, AppConfig, AppError, Environment, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // The tracing preset depends on APP_ENV, which is read again by AppConfig
    let env = std::env::var("APP_ENV")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(Environment::Development);
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, code = e.error_code(), "Bot stopped with an error");
        std::process::exit(e.exit_code());
    }
}

async fn run() -> Result<(), AppError> {
    info!("Starting Pearl bot...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        prefix = %config.bot.command_prefix,
        allowed_users = config.bot.allowed_user_ids.len(),
        "Configuration loaded"
    );

    pearl_bot::run(config).await
}
