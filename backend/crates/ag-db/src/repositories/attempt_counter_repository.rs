//! Failed-attempt counters backing the brute-force guard.
//!
//! All state lives in `attempt_counters`; two guard instances sharing a
//! database observe each other's failures and locks.

use crate::time::{from_millis, to_millis};
use crate::{DbError, Result as DbErrorResult};

use ag_core::{AttemptCounter, AttemptKind};

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

const TABLE: &str = "attempt_counters";

#[derive(sqlx::FromRow)]
struct AttemptCounterRow {
    kind: String,
    key: String,
    count: i64,
    window_start: i64,
    locked_until: Option<i64>,
}

impl TryFrom<AttemptCounterRow> for AttemptCounter {
    type Error = DbError;

    fn try_from(r: AttemptCounterRow) -> DbErrorResult<Self> {
        Ok(AttemptCounter {
            kind: AttemptKind::from_str(&r.kind)
                .map_err(|e| DbError::decode(TABLE, format!("invalid kind: {e}")))?,
            key: r.key,
            count: u32::try_from(r.count)
                .map_err(|_| DbError::decode(TABLE, format!("invalid count {}", r.count)))?,
            window_start: from_millis(TABLE, r.window_start)?,
            locked_until: r.locked_until.map(|ms| from_millis(TABLE, ms)).transpose()?,
        })
    }
}

#[derive(Clone)]
pub struct AttemptCounterRepository {
    pool: SqlitePool,
}

impl AttemptCounterRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, kind: AttemptKind, key: &str) -> DbErrorResult<Option<AttemptCounter>> {
        let row = sqlx::query_as::<_, AttemptCounterRow>(
            r#"
              SELECT kind, key, count, window_start, locked_until
              FROM attempt_counters
              WHERE kind = ? AND key = ?
              "#,
        )
        .bind(kind.as_str())
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AttemptCounter::try_from).transpose()
    }

    /// Count one failure and return the counter as stored afterwards.
    ///
    /// A fresh window (count 1, no lock) starts once the window has elapsed
    /// and no lock is in force; otherwise the count is incremented in place.
    /// The read and the write are a single upsert.
    pub async fn increment(
        &self,
        kind: AttemptKind,
        key: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> DbErrorResult<AttemptCounter> {
        let now_ms = to_millis(now);
        let cutoff_ms = to_millis(now - window);

        // ?3 = now, ?4 = start of the current window
        let row = sqlx::query_as::<_, AttemptCounterRow>(
            r#"
              INSERT INTO attempt_counters (kind, key, count, window_start, locked_until)
              VALUES (?1, ?2, 1, ?3, NULL)
              ON CONFLICT (kind, key) DO UPDATE SET
                  count = CASE
                      WHEN attempt_counters.window_start <= ?4
                           AND COALESCE(attempt_counters.locked_until, 0) <= ?3
                      THEN 1
                      ELSE attempt_counters.count + 1
                  END,
                  window_start = CASE
                      WHEN attempt_counters.window_start <= ?4
                           AND COALESCE(attempt_counters.locked_until, 0) <= ?3
                      THEN ?3
                      ELSE attempt_counters.window_start
                  END,
                  locked_until = CASE
                      WHEN attempt_counters.window_start <= ?4
                           AND COALESCE(attempt_counters.locked_until, 0) <= ?3
                      THEN NULL
                      ELSE attempt_counters.locked_until
                  END
              RETURNING kind, key, count, window_start, locked_until
              "#,
        )
        .bind(kind.as_str())
        .bind(key)
        .bind(now_ms)
        .bind(cutoff_ms)
        .fetch_one(&self.pool)
        .await?;

        AttemptCounter::try_from(row)
    }

    /// Extend the lock to `until`. An existing later lock is kept.
    pub async fn set_lock(
        &self,
        kind: AttemptKind,
        key: &str,
        until: DateTime<Utc>,
    ) -> DbErrorResult<()> {
        sqlx::query(
            r#"
              UPDATE attempt_counters
              SET locked_until = MAX(COALESCE(locked_until, 0), ?)
              WHERE kind = ? AND key = ?
              "#,
        )
        .bind(to_millis(until))
        .bind(kind.as_str())
        .bind(key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Zero the counter and drop any lock
    pub async fn reset(&self, kind: AttemptKind, key: &str, now: DateTime<Utc>) -> DbErrorResult<()> {
        sqlx::query(
            r#"
              UPDATE attempt_counters
              SET count = 0, window_start = ?, locked_until = NULL
              WHERE kind = ? AND key = ?
              "#,
        )
        .bind(to_millis(now))
        .bind(kind.as_str())
        .bind(key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
