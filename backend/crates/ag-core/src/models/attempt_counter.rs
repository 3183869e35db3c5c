use crate::AttemptKind;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Failed-attempt counter for one (kind, key) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptCounter {
    pub kind: AttemptKind,
    pub key: String,
    pub count: u32,
    pub window_start: DateTime<Utc>,
    pub locked_until: Option<DateTime<Utc>>,
}

impl AttemptCounter {
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }
}
