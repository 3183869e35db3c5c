//! Security audit trail.
//!
//! Appends never share a transaction with the decision they describe and a
//! failed append never changes the outcome returned to the caller.

use crate::AuthMetrics;

use ag_core::SecurityLogEntry;
use ag_db::SecurityLogRepository;

use log::{debug, error};

#[derive(Clone)]
pub struct SecurityAuditLog {
    repo: SecurityLogRepository,
    metrics: AuthMetrics,
}

impl SecurityAuditLog {
    pub fn new(repo: SecurityLogRepository, metrics: AuthMetrics) -> Self {
        Self { repo, metrics }
    }

    /// Append on a detached task. Used for failures and denials, whose
    /// response must not wait on (or fail because of) the audit write.
    pub fn record(&self, entry: SecurityLogEntry) {
        let this = self.clone();
        tokio::spawn(async move {
            this.append(&entry).await;
        });
    }

    /// Append before returning. Used for successes, so the trail holds the
    /// event by the time the client sees the response.
    pub async fn record_durable(&self, entry: SecurityLogEntry) {
        self.append(&entry).await;
    }

    async fn append(&self, entry: &SecurityLogEntry) {
        match self.repo.append(entry).await {
            Ok(()) => debug!("Audit {} recorded ({})", entry.event, entry.id),
            Err(e) => {
                self.metrics.audit_write_failed();
                error!("Failed to record audit event {}: {}", entry.event, e);
            }
        }
    }
}
