use crate::ApiError;

use ag_core::{Role, SecurityEventKind};
use ag_db::SecurityLogFilter;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 200;

/// `?page=&limit=`, 1-based
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    #[track_caller]
    pub fn resolve(&self) -> Result<(u32, u32), ApiError> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);

        if page < 1 {
            return Err(ApiError::validation("page must be >= 1", Some("page")));
        }
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(ApiError::validation(
                format!("limit must be 1-{MAX_PAGE_LIMIT}"),
                Some("limit"),
            ));
        }

        Ok((page, limit))
    }
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// Filters for `GET /admin/security-logs`
#[derive(Debug, Default, Deserialize)]
pub struct SecurityLogQuery {
    pub event: Option<SecurityEventKind>,
    pub actor_id: Option<Uuid>,
    pub email: Option<String>,
    pub origin: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl SecurityLogQuery {
    pub fn page(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }

    #[track_caller]
    pub fn filter(&self) -> Result<SecurityLogFilter, ApiError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(ApiError::validation("from must not be after to", Some("from")));
            }
        }

        Ok(SecurityLogFilter {
            event: self.event,
            actor_id: self.actor_id,
            email: self.email.as_deref().map(ag_core::validation::normalize_email),
            origin: self.origin.clone(),
            from: self.from,
            to: self.to,
        })
    }
}
