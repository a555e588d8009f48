//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use pearl_core::Snowflake;
use serde::Deserialize;
use std::{env, fmt, str::FromStr};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: GatewayConfig,
    pub bot: BotConfig,
    pub rest: RestConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(()),
        }
    }
}

/// Gateway session configuration
#[derive(Clone)]
pub struct GatewayConfig {
    /// Bot token sent in IDENTIFY and RESUME
    pub token: String,
    pub version: u8,
    pub encoding: String,
    /// Outbound payloads allowed per minute
    pub send_rate_per_minute: u32,
    pub send_burst: u32,
    pub connect_timeout_ms: u64,
    /// How long to wait for HELLO after the socket opens
    pub hello_timeout_ms: u64,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    /// Consecutive failed connects before the gateway URL is fetched again
    pub url_refresh_after: u32,
    pub identify: IdentifyConfig,
}

// Token stays out of logs
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("token", &"<redacted>")
            .field("version", &self.version)
            .field("encoding", &self.encoding)
            .field("send_rate_per_minute", &self.send_rate_per_minute)
            .field("send_burst", &self.send_burst)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("hello_timeout_ms", &self.hello_timeout_ms)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .field("backoff_max_ms", &self.backoff_max_ms)
            .field("url_refresh_after", &self.url_refresh_after)
            .field("identify", &self.identify)
            .finish()
    }
}

impl GatewayConfig {
    /// Build a config with defaults for everything except the token
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            version: default_gateway_version(),
            encoding: default_gateway_encoding(),
            send_rate_per_minute: default_send_rate_per_minute(),
            send_burst: default_send_burst(),
            connect_timeout_ms: default_connect_timeout_ms(),
            hello_timeout_ms: default_hello_timeout_ms(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            url_refresh_after: default_url_refresh_after(),
            identify: IdentifyConfig::default(),
        }
    }

    /// Append the version and encoding query to a gateway URL from REST
    #[must_use]
    pub fn decorate_url(&self, base: &str) -> String {
        format!(
            "{}/?v={}&encoding={}",
            base.trim_end_matches('/'),
            self.version,
            self.encoding
        )
    }
}

/// Connection properties reported in IDENTIFY
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentifyConfig {
    pub os: String,
    pub browser: String,
    pub device: String,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            os: default_identify_os(),
            browser: default_identify_client(),
            device: default_identify_client(),
        }
    }
}

/// Bot behaviour configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Character that marks a message as a command
    pub command_prefix: char,
    /// Authors allowed to run commands
    pub allowed_user_ids: Vec<Snowflake>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            allowed_user_ids: Vec::new(),
        }
    }
}

/// REST API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RestConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

// Default value functions
fn default_app_name() -> String {
    "pearl".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_api_url() -> String {
    "https://discord.com/api/v6".to_string()
}

fn default_gateway_version() -> u8 {
    6
}

fn default_gateway_encoding() -> String {
    "json".to_string()
}

fn default_send_rate_per_minute() -> u32 {
    120
}

fn default_send_burst() -> u32 {
    1
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_hello_timeout_ms() -> u64 {
    30_000
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_backoff_max_ms() -> u64 {
    60_000
}

fn default_url_refresh_after() -> u32 {
    3
}

fn default_identify_os() -> String {
    "linux".to_string()
}

fn default_identify_client() -> String {
    "pearl".to_string()
}

fn default_command_prefix() -> char {
    '!'
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or unparsable
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if required variables are missing or unparsable
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let encoding = vars.get("GATEWAY_ENCODING").unwrap_or_else(default_gateway_encoding);
        if encoding != "json" {
            return Err(ConfigError::InvalidValue("GATEWAY_ENCODING", encoding));
        }

        let send_rate_per_minute = vars.parsed("GATEWAY_SEND_RATE_PER_MINUTE", default_send_rate_per_minute)?;
        if send_rate_per_minute == 0 {
            return Err(ConfigError::InvalidValue("GATEWAY_SEND_RATE_PER_MINUTE", "0".to_string()));
        }

        Ok(Self {
            app: AppSettings {
                name: vars.get("APP_NAME").unwrap_or_else(default_app_name),
                env: match vars.get("APP_ENV") {
                    Some(raw) => raw
                        .parse()
                        .map_err(|()| ConfigError::InvalidValue("APP_ENV", raw))?,
                    None => default_env(),
                },
            },
            gateway: GatewayConfig {
                token: vars
                    .get("DISCORD_TOKEN")
                    .filter(|t| !t.trim().is_empty())
                    .ok_or(ConfigError::MissingVar("DISCORD_TOKEN"))?,
                version: vars.parsed("GATEWAY_VERSION", default_gateway_version)?,
                encoding,
                send_rate_per_minute,
                send_burst: vars.parsed("GATEWAY_SEND_BURST", default_send_burst)?.max(1),
                connect_timeout_ms: vars.parsed("GATEWAY_CONNECT_TIMEOUT_MS", default_connect_timeout_ms)?,
                hello_timeout_ms: vars.parsed("GATEWAY_HELLO_TIMEOUT_MS", default_hello_timeout_ms)?,
                backoff_base_ms: vars.parsed("GATEWAY_BACKOFF_BASE_MS", default_backoff_base_ms)?,
                backoff_max_ms: vars.parsed("GATEWAY_BACKOFF_MAX_MS", default_backoff_max_ms)?,
                url_refresh_after: vars.parsed("GATEWAY_URL_REFRESH_AFTER", default_url_refresh_after)?,
                identify: IdentifyConfig {
                    os: vars.get("IDENTIFY_OS").unwrap_or_else(default_identify_os),
                    browser: vars.get("IDENTIFY_BROWSER").unwrap_or_else(default_identify_client),
                    device: vars.get("IDENTIFY_DEVICE").unwrap_or_else(default_identify_client),
                },
            },
            bot: BotConfig {
                command_prefix: match vars.get("BOT_COMMAND_PREFIX") {
                    Some(raw) => parse_prefix(&raw)
                        .ok_or(ConfigError::InvalidValue("BOT_COMMAND_PREFIX", raw))?,
                    None => default_command_prefix(),
                },
                allowed_user_ids: vars
                    .get("BOT_ALLOWED_USER_IDS")
                    .map(|raw| parse_id_list(&raw))
                    .transpose()?
                    .unwrap_or_default(),
            },
            rest: RestConfig {
                api_url: vars.get("DISCORD_API_URL").unwrap_or_else(default_api_url),
            },
        })
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn parsed<T: FromStr>(&self, key: &'static str, default: fn() -> T) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw)),
            None => Ok(default()),
        }
    }
}

fn parse_prefix(raw: &str) -> Option<char> {
    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn parse_id_list(raw: &str) -> Result<Vec<Snowflake>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Snowflake::parse(s)
                .map_err(|_| ConfigError::InvalidValue("BOT_ALLOWED_USER_IDS", s.to_string()))
        })
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
