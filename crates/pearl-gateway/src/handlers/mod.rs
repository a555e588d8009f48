//! Payload handlers
//!
//! Control handlers are keyed by op code, event handlers by dispatch event
//! name. All run synchronously on the receive loop.

pub mod control;
mod error;
pub mod guild;
pub mod message;
pub mod ready;

pub use error::{HandlerError, HandlerResult};

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize an event body, tagging failures with the event name
pub(crate) fn parse<T: DeserializeOwned>(event: &'static str, body: &Value) -> HandlerResult<T> {
    T::deserialize(body).map_err(|source| HandlerError::Malformed { event, source })
}
