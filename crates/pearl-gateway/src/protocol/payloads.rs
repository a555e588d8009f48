//! Control payload bodies
//!
//! The `d` shapes of HELLO and of the client-sent control payloads.

use pearl_common::IdentifyConfig;
use pearl_core::Snowflake;
use serde::{Deserialize, Serialize};

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Payload for op 2 (Identify)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyPayload {
    pub token: String,
    pub properties: IdentifyProperties,
    /// Payload compression is never requested
    pub compress: bool,
}

impl IdentifyPayload {
    #[must_use]
    pub fn new(token: impl Into<String>, properties: IdentifyProperties) -> Self {
        Self {
            token: token.into(),
            properties,
            compress: false,
        }
    }
}

/// Client connection properties, under their v6 `$`-prefixed keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyProperties {
    #[serde(rename = "$os")]
    pub os: String,
    #[serde(rename = "$browser")]
    pub browser: String,
    #[serde(rename = "$device")]
    pub device: String,
}

impl From<&IdentifyConfig> for IdentifyProperties {
    fn from(config: &IdentifyConfig) -> Self {
        Self {
            os: config.os.clone(),
            browser: config.browser.clone(),
            device: config.device.clone(),
        }
    }
}

/// Payload for op 6 (Resume)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumePayload {
    pub token: String,
    pub session_id: String,
    /// Last sequence number received
    pub seq: u64,
}

/// Payload for op 8 (Request Guild Members)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestGuildMembersPayload {
    pub guild_id: Snowflake,
    pub limit: u32,
    /// Username prefix filter; empty requests everyone
    pub query: String,
}

impl RequestGuildMembersPayload {
    /// Members per chunk the client asks for
    pub const DEFAULT_LIMIT: u32 = 250;

    /// Request the whole member list of a guild
    #[must_use]
    pub fn all(guild_id: Snowflake) -> Self {
        Self {
            guild_id,
            limit: Self::DEFAULT_LIMIT,
            query: String::new(),
        }
    }
}
