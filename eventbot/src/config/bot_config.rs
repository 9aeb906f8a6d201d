//! BotConfig: token, service endpoint, polling, retry, and session tunables. Loaded from env.

use std::env;
use std::fmt;
use std::time::Duration;

use eventbot_core::{BotError, Result};

use super::env::{read_millis, read_secs, read_string, read_u32};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_RETRY_MAX_DELAY: Duration = Duration::from_secs(30);
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_EVICTION_INTERVAL: Duration = Duration::from_secs(60);

/// Immutable bot configuration, created once at startup.
#[derive(Clone)]
pub struct BotConfig {
    /// BOT_TOKEN
    pub token: String,
    /// BOT_API_URL
    pub api_url: String,
    /// POLL_INTERVAL_SECONDS: long-poll timeout and pause after an empty poll
    pub poll_interval: Duration,
    /// MAX_RETRIES: consecutive transient failures tolerated before giving up
    pub max_retries: u32,
    /// RETRY_BASE_DELAY_MS
    pub retry_base_delay: Duration,
    /// RETRY_MAX_DELAY_MS
    pub retry_max_delay: Duration,
    /// SEND_TIMEOUT_SECONDS
    pub send_timeout: Duration,
    /// SESSION_IDLE_TIMEOUT_SECONDS
    pub session_idle_timeout: Duration,
    /// EVICTION_INTERVAL_SECONDS
    pub eviction_interval: Duration,
    /// LOG_FILE; stdout only when unset
    pub log_file: Option<String>,
}

impl BotConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    /// Fails with a config error if the token is missing or empty or any tunable is malformed.
    pub fn load(token: Option<String>) -> Result<Self> {
        Self::from_lookup(token, |key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) against an arbitrary key/value source.
    pub fn from_lookup<F>(token: Option<String>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| read_string(&lookup, "BOT_TOKEN"))
            .ok_or_else(|| BotError::Config("BOT_TOKEN not set or empty".to_string()))?;

        let config = Self {
            token,
            api_url: read_string(&lookup, "BOT_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            poll_interval: read_secs(&lookup, "POLL_INTERVAL_SECONDS", DEFAULT_POLL_INTERVAL)?,
            max_retries: read_u32(&lookup, "MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            retry_base_delay: read_millis(
                &lookup,
                "RETRY_BASE_DELAY_MS",
                DEFAULT_RETRY_BASE_DELAY,
            )?,
            retry_max_delay: read_millis(&lookup, "RETRY_MAX_DELAY_MS", DEFAULT_RETRY_MAX_DELAY)?,
            send_timeout: read_secs(&lookup, "SEND_TIMEOUT_SECONDS", DEFAULT_SEND_TIMEOUT)?,
            session_idle_timeout: read_secs(
                &lookup,
                "SESSION_IDLE_TIMEOUT_SECONDS",
                DEFAULT_SESSION_IDLE_TIMEOUT,
            )?,
            eviction_interval: read_secs(
                &lookup,
                "EVICTION_INTERVAL_SECONDS",
                DEFAULT_EVICTION_INTERVAL,
            )?,
            log_file: read_string(&lookup, "LOG_FILE"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Config with the given token and defaults for everything else.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            retry_max_delay: DEFAULT_RETRY_MAX_DELAY,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            session_idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
            eviction_interval: DEFAULT_EVICTION_INTERVAL,
            log_file: None,
        }
    }

    /// Validate config. `load` calls this; call it again after editing fields by hand.
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(BotError::Config("BOT_TOKEN must not be empty".to_string()));
        }
        match reqwest::Url::parse(&self.api_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(BotError::Config(format!(
                    "BOT_API_URL is not a valid http(s) URL: {}",
                    self.api_url
                )))
            }
        }
        if self.poll_interval.is_zero() {
            return Err(BotError::Config(
                "POLL_INTERVAL_SECONDS must be greater than zero".to_string(),
            ));
        }
        if self.send_timeout.is_zero() {
            return Err(BotError::Config(
                "SEND_TIMEOUT_SECONDS must be greater than zero".to_string(),
            ));
        }
        if self.eviction_interval.is_zero() {
            return Err(BotError::Config(
                "EVICTION_INTERVAL_SECONDS must be greater than zero".to_string(),
            ));
        }
        if self.retry_base_delay > self.retry_max_delay {
            return Err(BotError::Config(format!(
                "RETRY_BASE_DELAY_MS ({}) exceeds RETRY_MAX_DELAY_MS ({})",
                self.retry_base_delay.as_millis(),
                self.retry_max_delay.as_millis()
            )));
        }
        Ok(())
    }

    /// Token with all but the last four characters masked.
    pub fn redacted_token(&self) -> String {
        let chars: Vec<char> = self.token.chars().collect();
        if chars.len() <= 4 {
            return "****".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{}", tail)
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &self.redacted_token())
            .field("api_url", &self.api_url)
            .field("poll_interval", &self.poll_interval)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("retry_max_delay", &self.retry_max_delay)
            .field("send_timeout", &self.send_timeout)
            .field("session_idle_timeout", &self.session_idle_timeout)
            .field("eviction_interval", &self.eviction_interval)
            .field("log_file", &self.log_file)
            .finish()
    }
}
