use ag_core::Backoff;

use chrono::Duration;

/// Threshold and lockout rules for one attempt-counter kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPolicy {
    /// Failures within `window` that trigger a lock
    pub max_attempts: u32,
    pub window: Duration,
    /// Lock length at the threshold
    pub lockout: Duration,
    /// Ceiling for exponential backoff
    pub max_lockout: Duration,
    pub backoff: Backoff,
}

impl AttemptPolicy {
    pub fn email_default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::minutes(15),
            lockout: Duration::minutes(15),
            max_lockout: Duration::hours(24),
            backoff: Backoff::Fixed,
        }
    }

    pub fn ip_default() -> Self {
        Self {
            max_attempts: 50,
            window: Duration::minutes(15),
            lockout: Duration::minutes(15),
            max_lockout: Duration::hours(24),
            backoff: Backoff::Fixed,
        }
    }

    /// Lock to apply once `count` failures have been recorded, if any.
    ///
    /// Exponential backoff doubles per failure past the threshold:
    /// `lockout * 2^(count - max_attempts)`, capped at `max_lockout`.
    pub fn lockout_for(&self, count: u32) -> Option<Duration> {
        if count < self.max_attempts {
            return None;
        }

        match self.backoff {
            Backoff::Fixed => Some(self.lockout),
            Backoff::Exponential => {
                let exponent = count - self.max_attempts;
                let scaled = 1i32
                    .checked_shl(exponent)
                    .filter(|factor| *factor > 0)
                    .and_then(|factor| self.lockout.checked_mul(factor));

                Some(match scaled {
                    Some(lock) => lock.min(self.max_lockout),
                    None => self.max_lockout,
                })
            }
        }
    }
}
