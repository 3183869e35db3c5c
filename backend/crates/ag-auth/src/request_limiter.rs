//! Coarse per-IP flood control for unauthenticated endpoints.
//!
//! This is in-process and advisory; the authoritative brute-force state is
//! the store-backed [`crate::BruteforceGuard`].

use crate::{AuthError, Result as AuthErrorResult};

use std::num::NonZeroU32;
use std::panic::Location;
use std::time::Duration;

use error_location::ErrorLocation;
use governor::clock::{Clock as GovernorClock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};

/// Requests allowed per window for each client address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RequestLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window_secs: 60,
        }
    }
}

pub struct RequestLimiter {
    limiter: RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>,
}

impl RequestLimiter {
    pub fn new(config: RequestLimitConfig) -> Self {
        let burst = NonZeroU32::new(config.max_requests).unwrap_or(NonZeroU32::MIN);
        let window = Duration::from_secs(config.window_secs.max(1));
        let replenish = window / burst.get();

        let quota = Quota::with_period(replenish)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Admit or reject one request from `client`
    #[track_caller]
    pub fn check(&self, client: &str) -> AuthErrorResult<()> {
        let key = client.to_string();
        self.limiter.check_key(&key).map_err(|not_until| {
            let wait = not_until.wait_time_from(DefaultClock::default().now());
            AuthError::RateLimited {
                retry_after_secs: wait.as_secs().max(1),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }

    /// Drop state for clients that have fully replenished
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
    }
}

impl Default for RequestLimiter {
    fn default() -> Self {
        Self::new(RequestLimitConfig::default())
    }
}
