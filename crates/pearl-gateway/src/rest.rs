//! REST boundary
//!
//! The gateway needs two things from the HTTP API: where to connect, and a way
//! for command replies to reach a channel. The binary supplies the HTTP client.

use async_trait::async_trait;
use pearl_core::Snowflake;

/// REST errors
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// Request could not be sent or the response not read
    #[error("Request failed: {0}")]
    Request(String),

    /// Non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body had an unexpected shape
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

#[async_trait]
pub trait RestApi: Send + Sync + 'static {
    /// Gateway URL, without version or encoding parameters
    async fn fetch_gateway_url(&self) -> Result<String, RestError>;

    /// Post a text message to a channel
    async fn create_message(&self, channel_id: Snowflake, content: &str) -> Result<(), RestError>;
}
