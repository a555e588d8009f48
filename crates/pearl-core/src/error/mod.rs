//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{Snowflake, SnowflakeParseError};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    InvalidSnowflake(#[from] SnowflakeParseError),

    #[error("Guild mismatch: expected {expected}, got {actual}")]
    GuildMismatch { expected: Snowflake, actual: Snowflake },

    #[error("Malformed object: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl CoreError {
    /// Get error code for logging
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidSnowflake(_) => "INVALID_SNOWFLAKE",
            Self::GuildMismatch { .. } => "GUILD_MISMATCH",
            Self::Malformed(_) => "MALFORMED_OBJECT",
        }
    }
}
