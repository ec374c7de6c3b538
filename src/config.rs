//! Viewer configuration, with defaults and environment overrides.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use viewport::ZoomConfig;

use crate::events::Messages;

pub const DEFAULT_RETRY_DELAY_MS: u64 = 2000;
pub const DEFAULT_RETRY_MULTIPLIER: f64 = 1.0;
pub const DEFAULT_LAYER_POLL_MS: u64 = 1000;

/// When and how often a failed session is retried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub delay: Duration,
    /// Growth factor applied per consecutive retry. `1.0` keeps it fixed.
    pub multiplier: f64,
    /// Upper bound on the grown delay.
    pub max_delay: Option<Duration>,
    /// Consecutive retries allowed before giving up. `None` never gives up.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            multiplier: DEFAULT_RETRY_MULTIPLIER,
            max_delay: None,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Delay before the `attempt`-th consecutive retry (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.multiplier.max(1.0).powi(exponent);
        let grown = self.delay.as_secs_f64() * factor;
        let capped = match self.max_delay {
            Some(max) => grown.min(max.as_secs_f64()),
            None => grown,
        };
        Duration::try_from_secs_f64(capped).unwrap_or(Duration::MAX)
    }

    /// Whether `retries` consecutive retries exhaust the policy.
    #[must_use]
    pub fn exhausted(&self, retries: u32) -> bool {
        self.max_attempts.is_some_and(|max| retries >= max)
    }
}

/// How the layer event channel is waited for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerPollPolicy {
    pub interval: Duration,
    /// Polls before giving up on quality switching. `None` polls forever.
    pub max_attempts: Option<u32>,
}

impl Default for LayerPollPolicy {
    fn default() -> Self {
        Self { interval: Duration::from_millis(DEFAULT_LAYER_POLL_MS), max_attempts: None }
    }
}

/// Everything one viewer instance is configured with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewerConfig {
    /// Signaling endpoint. Required before `start`.
    pub url: String,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub token: Option<String>,
    pub retry: RetryPolicy,
    pub layer_poll: LayerPollPolicy,
    pub zoom: ZoomConfig,
    pub messages: Messages,
}

impl ViewerConfig {
    #[must_use]
    pub fn new(url: &str) -> Self {
        Self { url: url.to_owned(), ..Self::default() }
    }

    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `WHEP_URL`: signaling endpoint
    /// - `WHEP_TOKEN`: bearer token
    /// - `WHEP_RETRY_DELAY_MS`: default 2000
    /// - `WHEP_RETRY_MULTIPLIER`: default 1.0 (fixed delay)
    /// - `WHEP_RETRY_MAX_DELAY_MS`: default unbounded
    /// - `WHEP_RETRY_MAX_ATTEMPTS`: default unbounded
    /// - `WHEP_LAYER_POLL_MS`: default 1000
    /// - `WHEP_LAYER_POLL_MAX`: default unbounded
    /// - `WHEP_ZOOM_PAN`: `true`/`1` enables zoom and pan
    /// - `WHEP_MAX_ZOOM`: default 10
    /// - `WHEP_ZOOM_STEP`: default 0.05
    #[must_use]
    pub fn from_env() -> Self {
        let zoom_defaults = ZoomConfig::default();
        Self {
            url: std::env::var("WHEP_URL").unwrap_or_default(),
            token: std::env::var("WHEP_TOKEN").ok().filter(|t| !t.is_empty()),
            retry: RetryPolicy {
                delay: Duration::from_millis(env_parse("WHEP_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS)),
                multiplier: env_parse("WHEP_RETRY_MULTIPLIER", DEFAULT_RETRY_MULTIPLIER),
                max_delay: env_parse_opt::<u64>("WHEP_RETRY_MAX_DELAY_MS").map(Duration::from_millis),
                max_attempts: env_parse_opt("WHEP_RETRY_MAX_ATTEMPTS"),
            },
            layer_poll: LayerPollPolicy {
                interval: Duration::from_millis(env_parse("WHEP_LAYER_POLL_MS", DEFAULT_LAYER_POLL_MS)),
                max_attempts: env_parse_opt("WHEP_LAYER_POLL_MAX"),
            },
            zoom: ZoomConfig {
                enabled: env_flag("WHEP_ZOOM_PAN"),
                max_zoom: env_parse("WHEP_MAX_ZOOM", zoom_defaults.max_zoom),
                zoom_step: env_parse("WHEP_ZOOM_STEP", zoom_defaults.zoom_step),
                ..zoom_defaults
            },
            messages: Messages::default(),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    env_parse_opt(key).unwrap_or(default)
}

fn env_parse_opt<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn env_flag(key: &str) -> bool {
    std::env::var(key).is_ok_and(|v| matches!(v.trim(), "1" | "true" | "yes" | "on"))
}
