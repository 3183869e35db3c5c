//! Append-only access to `security_logs`.
//!
//! There is deliberately no update or delete here; the schema rejects both.

use crate::time::{from_millis, parse_uuid, to_millis};
use crate::{DbError, Result as DbErrorResult};

use ag_core::{SecurityEventKind, SecurityLogEntry};

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

const TABLE: &str = "security_logs";

#[derive(sqlx::FromRow)]
struct SecurityLogRow {
    id: String,
    event: String,
    actor_id: Option<String>,
    email: Option<String>,
    origin: String,
    timestamp: i64,
    context: String,
}

impl TryFrom<SecurityLogRow> for SecurityLogEntry {
    type Error = DbError;

    fn try_from(r: SecurityLogRow) -> DbErrorResult<Self> {
        Ok(SecurityLogEntry {
            id: parse_uuid(TABLE, &r.id)?,
            event: SecurityEventKind::from_str(&r.event)
                .map_err(|e| DbError::decode(TABLE, format!("invalid event: {e}")))?,
            actor_id: r
                .actor_id
                .as_deref()
                .map(|id| parse_uuid(TABLE, id))
                .transpose()?,
            email: r.email,
            origin: r.origin,
            timestamp: from_millis(TABLE, r.timestamp)?,
            context: serde_json::from_str(&r.context)
                .map_err(|e| DbError::decode(TABLE, format!("invalid context: {e}")))?,
        })
    }
}

/// Optional predicates for [`SecurityLogRepository::list`]; all are ANDed.
#[derive(Debug, Clone, Default)]
pub struct SecurityLogFilter {
    pub event: Option<SecurityEventKind>,
    pub actor_id: Option<Uuid>,
    pub email: Option<String>,
    pub origin: Option<String>,
    /// Inclusive lower bound
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub to: Option<DateTime<Utc>>,
}

impl SecurityLogFilter {
    fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        builder.push(" WHERE 1 = 1");

        if let Some(event) = self.event {
            builder.push(" AND event = ").push_bind(event.as_str());
        }
        if let Some(actor_id) = self.actor_id {
            builder.push(" AND actor_id = ").push_bind(actor_id.to_string());
        }
        if let Some(email) = &self.email {
            builder
                .push(" AND email = ")
                .push_bind(email.clone())
                .push(" COLLATE NOCASE");
        }
        if let Some(origin) = &self.origin {
            builder.push(" AND origin = ").push_bind(origin.clone());
        }
        if let Some(from) = self.from {
            builder.push(" AND timestamp >= ").push_bind(to_millis(from));
        }
        if let Some(to) = self.to {
            builder.push(" AND timestamp <= ").push_bind(to_millis(to));
        }
    }
}

#[derive(Clone)]
pub struct SecurityLogRepository {
    pool: SqlitePool,
}

impl SecurityLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, entry: &SecurityLogEntry) -> DbErrorResult<()> {
        let context = serde_json::to_string(&entry.context)
            .map_err(|e| DbError::decode(TABLE, format!("unserializable context: {e}")))?;

        sqlx::query(
            r#"
              INSERT INTO security_logs (
                  id, event, actor_id, email, origin, timestamp, context
              ) VALUES (?, ?, ?, ?, ?, ?, ?)
              "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.event.as_str())
        .bind(entry.actor_id.map(|id| id.to_string()))
        .bind(&entry.email)
        .bind(&entry.origin)
        .bind(to_millis(entry.timestamp))
        .bind(context)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Newest first. Returns the total number of matching rows alongside the page.
    pub async fn list(
        &self,
        filter: &SecurityLogFilter,
        offset: i64,
        limit: i64,
    ) -> DbErrorResult<(i64, Vec<SecurityLogEntry>)> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM security_logs");
        filter.push_where(&mut count_query);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut page_query = QueryBuilder::<Sqlite>::new(
            "SELECT id, event, actor_id, email, origin, timestamp, context FROM security_logs",
        );
        filter.push_where(&mut page_query);
        page_query
            .push(" ORDER BY timestamp DESC, rowid DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = page_query
            .build_query_as::<SecurityLogRow>()
            .fetch_all(&self.pool)
            .await?;

        let entries = rows
            .into_iter()
            .map(SecurityLogEntry::try_from)
            .collect::<DbErrorResult<Vec<_>>>()?;

        Ok((total, entries))
    }
}
