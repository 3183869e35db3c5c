use crate::time::{from_millis, parse_uuid, to_millis};
use crate::{DbError, Result as DbErrorResult};

use ag_core::{Identity, Role};

use std::str::FromStr;

use sqlx::SqlitePool;
use uuid::Uuid;

const TABLE: &str = "identities";

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: String,
    email: String,
    password_hash: String,
    role: String,
    is_active: bool,
    is_verified: bool,
    created_at: i64,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = DbError;

    fn try_from(r: IdentityRow) -> DbErrorResult<Self> {
        Ok(Identity {
            id: parse_uuid(TABLE, &r.id)?,
            email: r.email,
            password_hash: r.password_hash,
            role: Role::from_str(&r.role)
                .map_err(|e| DbError::decode(TABLE, format!("invalid role: {e}")))?,
            is_active: r.is_active,
            is_verified: r.is_verified,
            created_at: from_millis(TABLE, r.created_at)?,
        })
    }
}

#[derive(Clone)]
pub struct IdentityRepository {
    pool: SqlitePool,
}

impl IdentityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, identity: &Identity) -> DbErrorResult<()> {
        sqlx::query(
            r#"
              INSERT INTO identities (
                  id, email, password_hash, role, is_active, is_verified, created_at
              ) VALUES (?, ?, ?, ?, ?, ?, ?)
              "#,
        )
        .bind(identity.id.to_string())
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(identity.role.as_str())
        .bind(identity.is_active)
        .bind(identity.is_verified)
        .bind(to_millis(identity.created_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new identity whose role depends on how many already exist:
    /// the first becomes superadmin, the second admin, everyone else user.
    /// The count and the insert are one statement, so two concurrent first
    /// registrations cannot both become superadmin. `identity.role` is ignored.
    pub async fn create_with_bootstrap_role(&self, identity: &Identity) -> DbErrorResult<Identity> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
              INSERT INTO identities (
                  id, email, password_hash, role, is_active, is_verified, created_at
              ) VALUES (
                  ?, ?, ?,
                  (SELECT CASE COUNT(*)
                              WHEN 0 THEN 'superadmin'
                              WHEN 1 THEN 'admin'
                              ELSE 'user'
                          END
                   FROM identities),
                  ?, ?, ?
              )
              RETURNING id, email, password_hash, role, is_active, is_verified, created_at
              "#,
        )
        .bind(identity.id.to_string())
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(identity.is_active)
        .bind(identity.is_verified)
        .bind(to_millis(identity.created_at))
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    pub async fn find_by_id(&self, id: Uuid) -> DbErrorResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
              SELECT id, email, password_hash, role, is_active, is_verified, created_at
              FROM identities
              WHERE id = ?
              "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Identity::try_from).transpose()
    }

    /// Case-insensitive lookup
    pub async fn find_by_email(&self, email: &str) -> DbErrorResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
              SELECT id, email, password_hash, role, is_active, is_verified, created_at
              FROM identities
              WHERE email = ? COLLATE NOCASE
              "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Identity::try_from).transpose()
    }

    pub async fn list(&self, offset: i64, limit: i64) -> DbErrorResult<Vec<Identity>> {
        let rows = sqlx::query_as::<_, IdentityRow>(
            r#"
              SELECT id, email, password_hash, role, is_active, is_verified, created_at
              FROM identities
              ORDER BY created_at ASC, email ASC
              LIMIT ? OFFSET ?
              "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Identity::try_from).collect()
    }

    pub async fn count(&self) -> DbErrorResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM identities")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> DbErrorResult<bool> {
        let result = sqlx::query("UPDATE identities SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_role(&self, id: Uuid, role: Role) -> DbErrorResult<bool> {
        let result = sqlx::query("UPDATE identities SET role = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool) -> DbErrorResult<bool> {
        let result = sqlx::query("UPDATE identities SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns false when the identity does not exist or was already verified
    pub async fn mark_verified(&self, id: Uuid) -> DbErrorResult<bool> {
        let result =
            sqlx::query("UPDATE identities SET is_verified = 1 WHERE id = ? AND is_verified = 0")
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
