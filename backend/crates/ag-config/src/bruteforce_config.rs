use crate::{ConfigError, ConfigErrorResult};

use ag_core::Backoff;

use serde::Deserialize;

pub const MAX_ATTEMPTS_CEILING: u32 = 10_000;
pub const MAX_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

/// Threshold and lockout for one attempt-counter key kind
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AttemptPolicyConfig {
    pub max_attempts: u32,
    pub window_secs: u64,
    pub lockout_secs: u64,
    pub max_lockout_secs: u64,
    pub backoff: Backoff,
}

impl AttemptPolicyConfig {
    pub fn email_default() -> Self {
        Self {
            max_attempts: 5,
            window_secs: 15 * 60,
            lockout_secs: 15 * 60,
            max_lockout_secs: 24 * 60 * 60,
            backoff: Backoff::Fixed,
        }
    }

    pub fn ip_default() -> Self {
        Self {
            max_attempts: 50,
            ..Self::email_default()
        }
    }

    /// `name` is the section path used in error messages, e.g. `bruteforce.email`
    pub fn validate(&self, name: &str) -> ConfigErrorResult<()> {
        if self.max_attempts == 0 || self.max_attempts > MAX_ATTEMPTS_CEILING {
            return Err(ConfigError::bruteforce(format!(
                "{name}.max_attempts must be 1-{MAX_ATTEMPTS_CEILING}, got {}",
                self.max_attempts
            )));
        }
        for (field, value) in [
            ("window_secs", self.window_secs),
            ("lockout_secs", self.lockout_secs),
            ("max_lockout_secs", self.max_lockout_secs),
        ] {
            if value == 0 || value > MAX_WINDOW_SECS {
                return Err(ConfigError::bruteforce(format!(
                    "{name}.{field} must be 1-{MAX_WINDOW_SECS}, got {value}"
                )));
            }
        }
        if self.max_lockout_secs < self.lockout_secs {
            return Err(ConfigError::bruteforce(format!(
                "{name}.max_lockout_secs ({}) must be >= lockout_secs ({})",
                self.max_lockout_secs, self.lockout_secs
            )));
        }
        Ok(())
    }
}

impl Default for AttemptPolicyConfig {
    fn default() -> Self {
        Self::email_default()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct BruteforceConfig {
    /// Failures keyed by submitted email
    pub email: AttemptPolicyConfig,
    /// Failures keyed by client address
    pub ip: AttemptPolicyConfig,
}

impl Default for BruteforceConfig {
    fn default() -> Self {
        Self {
            email: AttemptPolicyConfig::email_default(),
            ip: AttemptPolicyConfig::ip_default(),
        }
    }
}

impl BruteforceConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.email.validate("bruteforce.email")?;
        self.ip.validate("bruteforce.ip")
    }
}
