//! Payload codec
//!
//! Serializes outbound payloads, filling the bodies of control payloads from the
//! session as it stands at send time.

use super::{
    IdentifyPayload, IdentifyProperties, OpCode, Payload, RequestGuildMembersPayload, ResumePayload,
};
use crate::session::SessionSnapshot;
use pearl_common::GatewayConfig;
use serde_json::Value;
use std::fmt;

/// Codec errors
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown op code: {0}")]
    UnknownOpcode(u8),

    #[error("Dispatch payload without an event name")]
    MissingEventName,

    #[error("Cannot build {0} body: no session id")]
    MissingSessionId(OpCode),

    #[error("Cannot build {0} body: no guild known")]
    MissingGuild(OpCode),
}

/// Encoder for outbound payloads
pub struct Codec {
    token: String,
    properties: IdentifyProperties,
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

impl Codec {
    #[must_use]
    pub fn new(token: impl Into<String>, properties: IdentifyProperties) -> Self {
        Self {
            token: token.into(),
            properties,
        }
    }

    #[must_use]
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(config.token.clone(), IdentifyProperties::from(&config.identify))
    }

    /// Serialize a payload for the wire
    ///
    /// A `null` body on HEARTBEAT, IDENTIFY, RESUME or REQUEST_GUILD_MEMBERS is
    /// replaced with the protocol body built from `session`. Any other payload is
    /// written unchanged.
    pub fn encode(&self, payload: &Payload, session: &SessionSnapshot) -> Result<String, CodecError> {
        if !payload.d.is_null() {
            return payload.to_json();
        }

        let body = match payload.op {
            OpCode::Heartbeat => Value::from(session.last_sequence),
            OpCode::Identify => {
                serde_json::to_value(IdentifyPayload::new(self.token.clone(), self.properties.clone()))?
            }
            OpCode::Resume => {
                let session_id = session
                    .session_id
                    .clone()
                    .ok_or(CodecError::MissingSessionId(payload.op))?;
                serde_json::to_value(ResumePayload {
                    token: self.token.clone(),
                    session_id,
                    seq: session.last_sequence,
                })?
            }
            OpCode::RequestGuildMembers => {
                let guild_id = session.guild_id.ok_or(CodecError::MissingGuild(payload.op))?;
                serde_json::to_value(RequestGuildMembersPayload::all(guild_id))?
            }
            _ => return payload.to_json(),
        };

        Payload::with_data(payload.op, body).to_json()
    }
}
