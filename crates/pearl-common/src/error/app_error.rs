//! Application error types
//!
//! Top-level error for the bot binary. Library crates keep their own
//! error enums and are folded in here at the process boundary.

use crate::config::ConfigError;
use pearl_core::CoreError;
use std::fmt;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // Gateway session errors that escaped the reconnect loop
    #[error("Gateway error: {0}")]
    Gateway(String),

    // REST errors
    #[error("REST error: {0}")]
    Rest(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] CoreError),

    // Telemetry setup
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Get error code for logs
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Gateway(_) => "GATEWAY_ERROR",
            Self::Rest(_) => "REST_ERROR",
            Self::Domain(e) => e.code(),
            Self::Telemetry(_) => "TELEMETRY_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78,
            _ => 1,
        }
    }

    /// Create a gateway error
    #[must_use]
    pub fn gateway(msg: impl fmt::Display) -> Self {
        Self::Gateway(msg.to_string())
    }

    /// Create a REST error
    #[must_use]
    pub fn rest(msg: impl fmt::Display) -> Self {
        Self::Rest(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
