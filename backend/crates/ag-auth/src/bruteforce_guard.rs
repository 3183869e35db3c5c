//! Store-backed brute-force throttling.
//!
//! Counters are rows in the shared database, so every process (and every
//! guard instance) pointed at the same store sees the same locks.

use crate::{
    AttemptPolicy, AuthError, AuthMetrics, Clock, Result as AuthErrorResult, SecurityAuditLog,
};

use ag_core::{AttemptCounter, AttemptKind, SecurityEventKind, SecurityLogEntry};
use ag_db::AttemptCounterRepository;

use std::panic::Location;
use std::sync::Arc;

use chrono::{Duration, SubsecRound};
use error_location::ErrorLocation;
use log::warn;
use serde_json::json;

/// Outcome of [`BruteforceGuard::check`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Admit,
    Deny { retry_after: Duration },
}

impl GuardDecision {
    /// Whole seconds until the lock lifts, rounded up, at least 1
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Admit => None,
            Self::Deny { retry_after } => {
                let millis = retry_after.num_milliseconds().max(0) as u64;
                Some(millis.div_ceil(1000).max(1))
            }
        }
    }
}

#[derive(Clone)]
pub struct BruteforceGuard {
    counters: AttemptCounterRepository,
    audit: SecurityAuditLog,
    clock: Arc<dyn Clock>,
    email_policy: AttemptPolicy,
    ip_policy: AttemptPolicy,
    metrics: AuthMetrics,
}

impl BruteforceGuard {
    pub fn new(
        counters: AttemptCounterRepository,
        audit: SecurityAuditLog,
        clock: Arc<dyn Clock>,
        email_policy: AttemptPolicy,
        ip_policy: AttemptPolicy,
        metrics: AuthMetrics,
    ) -> Self {
        Self {
            counters,
            audit,
            clock,
            email_policy,
            ip_policy,
            metrics,
        }
    }

    pub fn policy(&self, kind: AttemptKind) -> &AttemptPolicy {
        match kind {
            AttemptKind::LoginByEmail => &self.email_policy,
            AttemptKind::LoginByIp => &self.ip_policy,
        }
    }

    /// Decide whether an attempt keyed by `key` may proceed.
    ///
    /// A denial is recorded as a `rate_limited` audit event from `origin`.
    pub async fn check(
        &self,
        kind: AttemptKind,
        key: &str,
        origin: &str,
    ) -> AuthErrorResult<GuardDecision> {
        let now = self.clock.now();

        let locked_until = self
            .counters
            .find(kind, key)
            .await?
            .filter(|counter| counter.is_locked_at(now))
            .and_then(|counter| counter.locked_until);

        let Some(locked_until) = locked_until else {
            return Ok(GuardDecision::Admit);
        };

        let decision = GuardDecision::Deny {
            retry_after: locked_until - now,
        };

        warn!("Attempt denied for {} key (locked until {})", kind, locked_until);
        self.metrics.rate_limited(kind.as_str());

        let mut entry = SecurityLogEntry::new(SecurityEventKind::RateLimited, origin, now)
            .with_context(json!({
                "kind": kind.as_str(),
                "retry_after_secs": decision.retry_after_secs(),
            }));
        if kind == AttemptKind::LoginByEmail {
            entry = entry.with_email(key);
        }
        self.audit.record(entry);

        Ok(decision)
    }

    /// [`Self::check`] that turns a denial into [`AuthError::RateLimited`]
    pub async fn admit(&self, kind: AttemptKind, key: &str, origin: &str) -> AuthErrorResult<()> {
        match self.check(kind, key, origin).await? {
            GuardDecision::Admit => Ok(()),
            decision => Err(AuthError::RateLimited {
                retry_after_secs: decision.retry_after_secs().unwrap_or(1),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Count a failure and lock the key once the policy threshold is reached.
    pub async fn record_failure(
        &self,
        kind: AttemptKind,
        key: &str,
    ) -> AuthErrorResult<AttemptCounter> {
        let now = self.clock.now();
        let policy = self.policy(kind);

        let mut counter = self.counters.increment(kind, key, now, policy.window).await?;

        let lockout = policy
            .lockout_for(counter.count)
            .filter(|_| !counter.is_locked_at(now));

        if let Some(lockout) = lockout {
            // Stored at millisecond precision
            let until = (now + lockout).trunc_subsecs(3);
            self.counters.set_lock(kind, key, until).await?;
            counter.locked_until = Some(until);
            warn!(
                "Locking {} key after {} failures for {}s",
                kind,
                counter.count,
                lockout.num_seconds()
            );
        }

        Ok(counter)
    }

    /// Clear the counter for `key`
    pub async fn record_success(&self, kind: AttemptKind, key: &str) -> AuthErrorResult<()> {
        self.counters.reset(kind, key, self.clock.now()).await?;
        Ok(())
    }
}
