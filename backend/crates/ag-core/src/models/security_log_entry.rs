use crate::SecurityEventKind;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One append-only audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityLogEntry {
    pub id: Uuid,
    pub event: SecurityEventKind,
    /// None when the actor is unknown, e.g. a failed login for an unregistered email
    pub actor_id: Option<Uuid>,
    pub email: Option<String>,
    pub origin: String,
    pub timestamp: DateTime<Utc>,
    pub context: Value,
}

impl SecurityLogEntry {
    pub fn new(event: SecurityEventKind, origin: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event,
            actor_id: None,
            email: None,
            origin: origin.into(),
            timestamp,
            context: Value::Null,
        }
    }

    pub fn with_actor(mut self, actor_id: Uuid) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }
}
