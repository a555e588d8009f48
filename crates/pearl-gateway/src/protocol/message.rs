//! Gateway payload envelope
//!
//! Every frame on the wire is `{op, d, s, t}`; `s` and `t` only accompany dispatches.

use super::{CodecError, OpCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A decoded or to-be-sent gateway payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    /// Operation code
    pub op: OpCode,

    /// Body; `null` for control payloads whose body is filled at encode time
    pub d: Value,

    /// Sequence number (dispatch only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event name (dispatch only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

#[derive(Deserialize)]
struct RawPayload {
    op: u8,
    #[serde(default)]
    d: Value,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
}

impl Payload {
    /// Decode a text frame
    ///
    /// Sequence and event name are dropped from non-dispatch payloads; a dispatch
    /// without an event name is rejected.
    pub fn decode(text: &str) -> Result<Self, CodecError> {
        let raw: RawPayload = serde_json::from_str(text)?;
        let op = OpCode::from_u8(raw.op).ok_or(CodecError::UnknownOpcode(raw.op))?;

        if op != OpCode::Dispatch {
            return Ok(Self::with_data(op, raw.d));
        }

        let t = raw.t.filter(|t| !t.is_empty()).ok_or(CodecError::MissingEventName)?;
        Ok(Self {
            op,
            d: raw.d,
            s: raw.s,
            t: Some(t),
        })
    }

    /// Heartbeat carrying the last sequence number
    #[must_use]
    pub fn heartbeat(last_sequence: u64) -> Self {
        Self::with_data(OpCode::Heartbeat, Value::from(last_sequence))
    }

    /// Control payload with an empty body, filled by the codec on send
    #[must_use]
    pub fn control(op: OpCode) -> Self {
        Self::with_data(op, Value::Null)
    }

    /// Control payload with an explicit body
    #[must_use]
    pub fn with_data(op: OpCode, d: Value) -> Self {
        Self {
            op,
            d,
            s: None,
            t: None,
        }
    }

    /// Dispatch payload (server side; used by tests and tooling)
    #[must_use]
    pub fn dispatch(event: impl Into<String>, sequence: u64, d: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            d,
            s: Some(sequence),
            t: Some(event.into()),
        }
    }

    /// Event name of a dispatch
    #[must_use]
    pub fn event_name(&self) -> Option<&str> {
        self.t.as_deref()
    }

    /// Serialize as-is, without filling any body
    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl std::fmt::Display for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.t, self.s) {
            (Some(t), Some(s)) => write!(f, "Payload(op={}, t={t}, s={s})", self.op),
            (Some(t), None) => write!(f, "Payload(op={}, t={t})", self.op),
            _ => write!(f, "Payload(op={})", self.op),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_dispatch() {
        let payload =
            Payload::decode(r#"{"op":0,"d":{"session_id":"abc"},"s":3,"t":"READY"}"#).unwrap();

        assert_eq!(payload.op, OpCode::Dispatch);
        assert_eq!(payload.s, Some(3));
        assert_eq!(payload.event_name(), Some("READY"));
        assert_eq!(payload.d["session_id"], "abc");
    }

    #[test]
    fn test_decode_strips_dispatch_fields_from_control() {
        let payload = Payload::decode(r#"{"op":11,"d":null,"s":9,"t":"BOGUS"}"#).unwrap();

        assert_eq!(payload.op, OpCode::HeartbeatAck);
        assert!(payload.s.is_none());
        assert!(payload.t.is_none());
        assert!(payload.d.is_null());
    }

    #[test]
    fn test_decode_missing_body_is_null() {
        let payload = Payload::decode(r#"{"op":7}"#).unwrap();
        assert_eq!(payload.op, OpCode::Reconnect);
        assert!(payload.d.is_null());
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(Payload::decode("not json"), Err(CodecError::Json(_))));
        assert!(matches!(
            Payload::decode(r#"{"op":5,"d":null}"#),
            Err(CodecError::UnknownOpcode(5))
        ));
        assert!(matches!(
            Payload::decode(r#"{"op":0,"d":{},"s":1}"#),
            Err(CodecError::MissingEventName)
        ));
        assert!(matches!(
            Payload::decode(r#"{"op":0,"d":{},"s":1,"t":""}"#),
            Err(CodecError::MissingEventName)
        ));
    }

    #[test]
    fn test_heartbeat_is_bare_integer() {
        let json = Payload::heartbeat(42).to_json().unwrap();
        assert_eq!(json, r#"{"op":1,"d":42}"#);
    }

    #[test]
    fn test_display() {
        let dispatch = Payload::dispatch("MESSAGE_CREATE", 5, json!({}));
        let display = dispatch.to_string();
        assert!(display.contains("MESSAGE_CREATE"));
        assert!(display.contains("s=5"));

        assert_eq!(Payload::control(OpCode::Identify).to_string(), "Payload(op=Identify (2))");
    }
}
