//! Bot configuration loaded from the environment (and `.env` when the binary loads it first).

mod bot_config;
mod env;


pub use bot_config::{
    BotConfig, DEFAULT_API_URL, DEFAULT_EVICTION_INTERVAL, DEFAULT_MAX_RETRIES,
    DEFAULT_POLL_INTERVAL, DEFAULT_RETRY_BASE_DELAY, DEFAULT_RETRY_MAX_DELAY,
    DEFAULT_SEND_TIMEOUT, DEFAULT_SESSION_IDLE_TIMEOUT,
};
