//! REST client
//!
//! Implements the gateway's REST boundary with reqwest: the gateway URL lookup
//! and posting replies to a channel.

use async_trait::async_trait;
use pearl_common::RestConfig;
use pearl_core::Snowflake;
use pearl_gateway::{RestApi, RestError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    url: String,
}

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

/// HTTP API client authenticated as a bot
#[derive(Clone)]
pub struct RestClient {
    http: Client,
    api_url: String,
}

impl RestClient {
    /// Build a client sending `Authorization: Bot <token>` on every request
    pub fn new(config: &RestConfig, token: &str) -> Result<Self, RestError> {
        let mut auth = HeaderValue::from_str(&format!("Bot {token}"))
            .map_err(|_| RestError::Request("token is not a valid header value".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("DiscordBot (pearl, ", env!("CARGO_PKG_VERSION"), ")")),
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(request_error)?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full URL for an API path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RestApi for RestClient {
    async fn fetch_gateway_url(&self) -> Result<String, RestError> {
        let response = self
            .http
            .get(self.endpoint("gateway"))
            .send()
            .await
            .map_err(request_error)?;

        let body: GatewayResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| RestError::Decode(e.to_string()))?;
        Ok(body.url)
    }

    async fn create_message(&self, channel_id: Snowflake, content: &str) -> Result<(), RestError> {
        let response = self
            .http
            .post(self.endpoint(&format!("channels/{channel_id}/messages")))
            .json(&CreateMessage { content })
            .send()
            .await
            .map_err(request_error)?;

        check_status(response).await?;
        tracing::debug!(channel_id = %channel_id, "Message created");
        Ok(())
    }
}

fn request_error(err: reqwest::Error) -> RestError {
    RestError::Request(err.to_string())
}

async fn check_status(response: Response) -> Result<Response, RestError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RestError::Status {
        status: status.as_u16(),
        body,
    })
}
