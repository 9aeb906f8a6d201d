//! Typed readers for environment values. Unset or blank values fall back to the default;
//! present but malformed values are config errors.

use std::time::Duration;

use eventbot_core::{BotError, Result};

pub(crate) fn read_string<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn read_u64<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match read_string(lookup, key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| {
            BotError::Config(format!(
                "{} must be a non-negative integer, got {:?}",
                key, raw
            ))
        }),
    }
}

pub(crate) fn read_u32<F>(lookup: &F, key: &str, default: u32) -> Result<u32>
where
    F: Fn(&str) -> Option<String>,
{
    let value = read_u64(lookup, key, u64::from(default))?;
    u32::try_from(value).map_err(|_| BotError::Config(format!("{} is too large: {}", key, value)))
}

pub(crate) fn read_secs<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    read_u64(lookup, key, default.as_secs()).map(Duration::from_secs)
}

pub(crate) fn read_millis<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    read_u64(lookup, key, default_ms).map(Duration::from_millis)
}
