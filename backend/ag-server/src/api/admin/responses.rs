use crate::IdentityDto;

use ag_auth::Page;
use ag_core::{Identity, SecurityEventKind, SecurityLogEntry};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct IdentityListResponse {
    pub items: Vec<IdentityDto>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl From<Page<Identity>> for IdentityListResponse {
    fn from(page: Page<Identity>) -> Self {
        Self {
            items: page.items.into_iter().map(IdentityDto::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SecurityLogDto {
    pub id: Uuid,
    pub event: SecurityEventKind,
    pub actor_id: Option<Uuid>,
    pub email: Option<String>,
    pub origin: String,
    pub timestamp: DateTime<Utc>,
    pub context: Value,
}

impl From<SecurityLogEntry> for SecurityLogDto {
    fn from(entry: SecurityLogEntry) -> Self {
        Self {
            id: entry.id,
            event: entry.event,
            actor_id: entry.actor_id,
            email: entry.email,
            origin: entry.origin,
            timestamp: entry.timestamp,
            context: entry.context,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SecurityLogListResponse {
    pub items: Vec<SecurityLogDto>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl From<Page<SecurityLogEntry>> for SecurityLogListResponse {
    fn from(page: Page<SecurityLogEntry>) -> Self {
        Self {
            items: page.items.into_iter().map(SecurityLogDto::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
        }
    }
}
