//! Refresh token persistence.
//!
//! Records are only ever mutated in two ways: `replaced_by` is set once by
//! [`RefreshTokenRepository::rotate`], and `revoked` is set by logout,
//! administrative action or reuse containment. Nothing here deletes a row;
//! rotated and revoked links are the evidence reuse detection relies on.

use crate::time::{from_millis, parse_uuid, to_millis};
use crate::{DbError, Result as DbErrorResult};

use ag_core::{ClientFingerprint, RefreshTokenRecord};

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};
use uuid::Uuid;

const TABLE: &str = "refresh_tokens";

/// Upper bound on links followed when revoking a chain
const MAX_CHAIN_WALK: usize = 10_000;

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    id: String,
    identity_id: String,
    session_id: String,
    token_hash: String,
    issued_at: i64,
    expires_at: i64,
    revoked: bool,
    revoked_at: Option<i64>,
    replaced_by: Option<String>,
    ip_address: String,
    user_agent: Option<String>,
}

impl TryFrom<RefreshTokenRow> for RefreshTokenRecord {
    type Error = DbError;

    fn try_from(r: RefreshTokenRow) -> DbErrorResult<Self> {
        Ok(RefreshTokenRecord {
            id: parse_uuid(TABLE, &r.id)?,
            identity_id: parse_uuid(TABLE, &r.identity_id)?,
            session_id: parse_uuid(TABLE, &r.session_id)?,
            token_hash: r.token_hash,
            issued_at: from_millis(TABLE, r.issued_at)?,
            expires_at: from_millis(TABLE, r.expires_at)?,
            revoked: r.revoked,
            revoked_at: r.revoked_at.map(|ms| from_millis(TABLE, ms)).transpose()?,
            replaced_by: r
                .replaced_by
                .as_deref()
                .map(|id| parse_uuid(TABLE, id))
                .transpose()?,
            fingerprint: ClientFingerprint {
                ip_address: r.ip_address,
                user_agent: r.user_agent,
            },
        })
    }
}

/// Result of the compare-and-swap in [`RefreshTokenRepository::rotate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateOutcome {
    /// The successor was stored and the presented record now points at it
    Rotated,
    /// The presented record was no longer active; nothing was written
    Conflict,
}

#[derive(Clone)]
pub struct RefreshTokenRepository {
    pool: SqlitePool,
}

impl RefreshTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, record: &RefreshTokenRecord) -> DbErrorResult<()> {
        Self::insert(&self.pool, record).await
    }

    async fn insert<'e, E>(executor: E, record: &RefreshTokenRecord) -> DbErrorResult<()>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
              INSERT INTO refresh_tokens (
                  id, identity_id, session_id, token_hash,
                  issued_at, expires_at, revoked, revoked_at,
                  replaced_by, ip_address, user_agent
              ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
              "#,
        )
        .bind(record.id.to_string())
        .bind(record.identity_id.to_string())
        .bind(record.session_id.to_string())
        .bind(&record.token_hash)
        .bind(to_millis(record.issued_at))
        .bind(to_millis(record.expires_at))
        .bind(record.revoked)
        .bind(record.revoked_at.map(to_millis))
        .bind(record.replaced_by.map(|id| id.to_string()))
        .bind(&record.fingerprint.ip_address)
        .bind(&record.fingerprint.user_agent)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn find_by_hash(&self, token_hash: &str) -> DbErrorResult<Option<RefreshTokenRecord>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
              SELECT id, identity_id, session_id, token_hash,
                     issued_at, expires_at, revoked, revoked_at,
                     replaced_by, ip_address, user_agent
              FROM refresh_tokens
              WHERE token_hash = ?
              "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(RefreshTokenRecord::try_from).transpose()
    }

    pub async fn find_by_id(&self, id: Uuid) -> DbErrorResult<Option<RefreshTokenRecord>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
              SELECT id, identity_id, session_id, token_hash,
                     issued_at, expires_at, revoked, revoked_at,
                     replaced_by, ip_address, user_agent
              FROM refresh_tokens
              WHERE id = ?
              "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(RefreshTokenRecord::try_from).transpose()
    }

    /// Every link of one login session, oldest first
    pub async fn find_by_session(&self, session_id: Uuid) -> DbErrorResult<Vec<RefreshTokenRecord>> {
        let rows = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
              SELECT id, identity_id, session_id, token_hash,
                     issued_at, expires_at, revoked, revoked_at,
                     replaced_by, ip_address, user_agent
              FROM refresh_tokens
              WHERE session_id = ?
              ORDER BY issued_at ASC, rowid ASC
              "#,
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RefreshTokenRecord::try_from).collect()
    }

    pub async fn count_active_for_identity(
        &self,
        identity_id: Uuid,
        now: DateTime<Utc>,
    ) -> DbErrorResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
              SELECT COUNT(*)
              FROM refresh_tokens
              WHERE identity_id = ? AND revoked = 0 AND replaced_by IS NULL AND expires_at > ?
              "#,
        )
        .bind(identity_id.to_string())
        .bind(to_millis(now))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Store `successor` and point `current_id` at it, in one transaction.
    ///
    /// The update only matches while the current record is still unreplaced,
    /// unrevoked and unexpired. When two callers race on the same record the
    /// loser's update matches zero rows, its insert is rolled back and it gets
    /// [`RotateOutcome::Conflict`].
    pub async fn rotate(
        &self,
        current_id: Uuid,
        successor: &RefreshTokenRecord,
    ) -> DbErrorResult<RotateOutcome> {
        let mut tx = self.pool.begin().await?;

        Self::insert(&mut *tx, successor).await?;

        let result = sqlx::query(
            r#"
              UPDATE refresh_tokens
              SET replaced_by = ?
              WHERE id = ?
                AND replaced_by IS NULL
                AND revoked = 0
                AND expires_at > ?
              "#,
        )
        .bind(successor.id.to_string())
        .bind(current_id.to_string())
        .bind(to_millis(successor.issued_at))
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(RotateOutcome::Conflict);
        }

        tx.commit().await?;

        Ok(RotateOutcome::Rotated)
    }

    /// Revoke a single record if it is still the tip of its chain.
    ///
    /// Returns false for unknown, already revoked or already rotated records.
    pub async fn revoke_if_active(&self, id: Uuid, now: DateTime<Utc>) -> DbErrorResult<bool> {
        let result = sqlx::query(
            r#"
              UPDATE refresh_tokens
              SET revoked = 1, revoked_at = ?
              WHERE id = ? AND revoked = 0 AND replaced_by IS NULL
              "#,
        )
        .bind(to_millis(now))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revoke `start_id` and every link reachable from it through `replaced_by`,
    /// including the current tip. Returns the ids walked, in chain order.
    ///
    /// Every step is an update, so the transaction holds the write lock from
    /// its first statement and no rotation can extend the chain mid-walk.
    pub async fn revoke_chain_from(
        &self,
        start_id: Uuid,
        now: DateTime<Utc>,
    ) -> DbErrorResult<Vec<Uuid>> {
        let mut tx = self.pool.begin().await?;
        let now_ms = to_millis(now);

        let mut chain = Vec::new();
        let mut current = Some(start_id);

        while let Some(id) = current {
            if chain.len() >= MAX_CHAIN_WALK {
                log::warn!(
                    "Refresh chain walk from {} stopped after {} links",
                    start_id,
                    MAX_CHAIN_WALK
                );
                break;
            }

            let next = sqlx::query_scalar::<_, Option<String>>(
                r#"
                  UPDATE refresh_tokens
                  SET revoked_at = CASE WHEN revoked = 0 THEN ? ELSE revoked_at END,
                      revoked = 1
                  WHERE id = ?
                  RETURNING replaced_by
                  "#,
            )
            .bind(now_ms)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;

            let Some(next) = next else {
                break;
            };

            chain.push(id);
            current = next.as_deref().map(|s| parse_uuid(TABLE, s)).transpose()?;
        }

        tx.commit().await?;

        Ok(chain)
    }

    /// Revoke every unrevoked token the identity holds, across all sessions
    pub async fn revoke_all_for_identity(
        &self,
        identity_id: Uuid,
        now: DateTime<Utc>,
    ) -> DbErrorResult<u64> {
        let result = sqlx::query(
            r#"
              UPDATE refresh_tokens
              SET revoked = 1, revoked_at = ?
              WHERE identity_id = ? AND revoked = 0
              "#,
        )
        .bind(to_millis(now))
        .bind(identity_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
