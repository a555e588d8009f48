//! Gateway client errors

use crate::protocol::CloseCode;
use crate::rest::RestError;
use crate::transport::TransportError;

/// Errors from a connection attempt
///
/// Everything except [`GatewayError::FatalClose`] is transient: the reconnect
/// loop logs it and tries again.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),

    /// The server closed with a code that rules out reconnecting
    #[error("Gateway closed the connection: {}", describe_close(.0))]
    FatalClose(u16),

    #[error("Failed to fetch gateway URL: {0}")]
    Rest(#[from] RestError),

    /// A connection task failed unexpectedly
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Whether the reconnect loop must give up
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FatalClose(_))
    }

    /// Get error code for logging
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "TRANSPORT",
            Self::Timeout(_) => "TIMEOUT",
            Self::FatalClose(_) => "FATAL_CLOSE",
            Self::Rest(_) => "REST",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

fn describe_close(code: &u16) -> String {
    let code = *code;
    match CloseCode::from_u16(code) {
        Some(close) => format!("{} ({code})", close.description()),
        None => format!("close code {code}"),
    }
}
