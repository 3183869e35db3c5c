use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

pub const MIN_REQUEST_LIMIT_REQUESTS: u32 = 1;
pub const MAX_REQUEST_LIMIT_REQUESTS: u32 = 10_000;
pub const DEFAULT_REQUEST_LIMIT_REQUESTS: u32 = 30;

pub const MIN_REQUEST_LIMIT_WINDOW_SECS: u64 = 1;
pub const MAX_REQUEST_LIMIT_WINDOW_SECS: u64 = 3600;
pub const DEFAULT_REQUEST_LIMIT_WINDOW_SECS: u64 = 60;

/// Per-address request throttle on the unauthenticated `/auth` routes
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RequestLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RequestLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_REQUEST_LIMIT_REQUESTS,
            window_secs: DEFAULT_REQUEST_LIMIT_WINDOW_SECS,
        }
    }
}

impl RequestLimitConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !(MIN_REQUEST_LIMIT_REQUESTS..=MAX_REQUEST_LIMIT_REQUESTS).contains(&self.max_requests) {
            return Err(ConfigError::config(format!(
                "request_limit.max_requests must be {}-{}, got {}",
                MIN_REQUEST_LIMIT_REQUESTS, MAX_REQUEST_LIMIT_REQUESTS, self.max_requests
            )));
        }

        if !(MIN_REQUEST_LIMIT_WINDOW_SECS..=MAX_REQUEST_LIMIT_WINDOW_SECS).contains(&self.window_secs)
        {
            return Err(ConfigError::config(format!(
                "request_limit.window_secs must be {}-{}, got {}",
                MIN_REQUEST_LIMIT_WINDOW_SECS, MAX_REQUEST_LIMIT_WINDOW_SECS, self.window_secs
            )));
        }

        Ok(())
    }
}
