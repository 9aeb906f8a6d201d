//! Exponential backoff with jitter for reconnect attempts.

use std::time::Duration;

use crate::config::BotConfig;

/// Retry budget and delay curve for transient transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive failures tolerated; one more escalates to `ServiceUnavailable`.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: crate::config::DEFAULT_MAX_RETRIES,
            base_delay: crate::config::DEFAULT_RETRY_BASE_DELAY,
            max_delay: crate::config::DEFAULT_RETRY_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay,
            max_delay: config.retry_max_delay,
        }
    }

    /// Un-jittered delay before retry number `attempt` (0-based): `min(base * 2^attempt, max)`.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// [`base_delay`](Self::base_delay) with ±20% random jitter.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        apply_jitter(self.base_delay(attempt), rand::random::<f64>())
    }
}

/// Scales `delay` by `0.8 + sample * 0.4`; `sample` is clamped to `[0, 1]`.
pub fn apply_jitter(delay: Duration, sample: f64) -> Duration {
    let factor = 0.8 + sample.clamp(0.0, 1.0) * 0.4;
    delay.mul_f64(factor)
}
