//! Handler error types

use crate::commands::CommandQueueClosed;
use pearl_core::CoreError;
use thiserror::Error;

/// Handler error type
///
/// Handler errors are logged by the receive loop; they never end the connection.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Event body did not have the expected shape
    #[error("Malformed {event} payload: {source}")]
    Malformed {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Domain error (guild mismatch, bad snowflake)
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Guild event before any guild is known
    #[error("No guild is being tracked")]
    NoGuild,

    /// Nobody is consuming commands any more
    #[error(transparent)]
    CommandQueue(#[from] CommandQueueClosed),
}

impl HandlerError {
    /// Get error code for logging
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "MALFORMED_PAYLOAD",
            Self::Domain(e) => e.code(),
            Self::NoGuild => "NO_GUILD",
            Self::CommandQueue(_) => "COMMAND_QUEUE_CLOSED",
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
