//! Redis pub/sub feed settings

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Redis pub/sub configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Wait before reconnecting after the subscription drops
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
}

impl RedisConfig {
    /// Connect timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("REDIS_URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("redis"));
        }
        Ok(())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout(),
            reconnect_delay_ms: default_reconnect_delay(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}

fn default_reconnect_delay() -> u64 {
    1000
}
