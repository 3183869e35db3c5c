use metrics::{counter, histogram};

/// Operational counters for the authentication flows
#[derive(Clone)]
pub struct AuthMetrics {
    prefix: &'static str,
}

impl AuthMetrics {
    pub fn new() -> Self {
        Self { prefix: "authgate" }
    }

    pub fn login_succeeded(&self) {
        counter!(format!("{}.logins.success", self.prefix)).increment(1);
    }

    pub fn login_failed(&self) {
        counter!(format!("{}.logins.failure", self.prefix)).increment(1);
    }

    pub fn refresh_succeeded(&self) {
        counter!(format!("{}.refreshes.success", self.prefix)).increment(1);
    }

    /// `reason` is one of the session-invalid reasons
    pub fn refresh_failed(&self, reason: &str) {
        counter!(format!("{}.refreshes.failure", self.prefix)).increment(1);
        counter!(format!("{}.refreshes.failure.{}", self.prefix, reason)).increment(1);
    }

    pub fn reuse_detected(&self, revoked_links: usize) {
        counter!(format!("{}.refreshes.reuse_detected", self.prefix)).increment(1);
        histogram!(format!("{}.refreshes.reuse_chain_length", self.prefix))
            .record(revoked_links as f64);
    }

    pub fn rate_limited(&self, kind: &str) {
        counter!(format!("{}.rate_limited", self.prefix)).increment(1);
        counter!(format!("{}.rate_limited.{}", self.prefix, kind)).increment(1);
    }

    pub fn audit_write_failed(&self) {
        counter!(format!("{}.audit.write_failures", self.prefix)).increment(1);
    }

    pub fn password_verify_latency(&self, duration: std::time::Duration) {
        histogram!(format!("{}.credentials.verify_ms", self.prefix))
            .record(duration.as_millis() as f64);
    }
}

impl Default for AuthMetrics {
    fn default() -> Self {
        Self::new()
    }
}
