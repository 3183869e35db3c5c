use crate::time::{parse_uuid, to_millis};
use crate::Result as DbErrorResult;

use ag_core::PasswordResetToken;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

const TABLE: &str = "password_reset_tokens";

#[derive(Clone)]
pub struct PasswordResetRepository {
    pool: SqlitePool,
}

impl PasswordResetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, token: &PasswordResetToken) -> DbErrorResult<()> {
        sqlx::query(
            r#"
              INSERT INTO password_reset_tokens (
                  id, identity_id, token_hash, expires_at, used, created_at
              ) VALUES (?, ?, ?, ?, ?, ?)
              "#,
        )
        .bind(token.id.to_string())
        .bind(token.identity_id.to_string())
        .bind(&token.token_hash)
        .bind(to_millis(token.expires_at))
        .bind(token.used)
        .bind(to_millis(token.created_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Mark an unused, unexpired token as used and return its identity.
    ///
    /// Returns None for unknown, expired or already used tokens. Of two
    /// concurrent calls with the same hash only one gets the identity.
    pub async fn consume(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> DbErrorResult<Option<Uuid>> {
        let now_ms = to_millis(now);

        let identity_id = sqlx::query_scalar::<_, String>(
            r#"
              UPDATE password_reset_tokens
              SET used = 1, used_at = ?
              WHERE token_hash = ? AND used = 0 AND expires_at > ?
              RETURNING identity_id
              "#,
        )
        .bind(now_ms)
        .bind(token_hash)
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        identity_id.map(|id| parse_uuid(TABLE, &id)).transpose()
    }
}
