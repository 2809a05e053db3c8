//! Postgres-backed credential store.
//!
//! Expects the `users` table owned by the user-management module:
//!
//! ```sql
//! CREATE TABLE users (
//!     id            UUID PRIMARY KEY,
//!     email         TEXT NOT NULL UNIQUE,
//!     name          TEXT NOT NULL,
//!     password_hash TEXT NOT NULL,
//!     role          TEXT NOT NULL CHECK (role IN ('admin', 'technician', 'client')),
//!     active        BOOLEAN NOT NULL DEFAULT TRUE,
//!     last_login    TIMESTAMPTZ
//! );
//! ```
//!
//! ## Error Mapping
//!
//! Every SQLx error becomes `StoreError::Unavailable`; a row that cannot be
//! mapped (unknown role string) becomes `StoreError::Corrupt`. Nothing is
//! retried here.
//!
//! ## Runtime
//!
//! `CredentialStore` is synchronous. Calls block the current worker via
//! `tokio::task::block_in_place`, so they must run on a multi-threaded tokio
//! runtime (the axum server's default).

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use fieldops_auth::{CredentialStore, PasswordHash, Role, StoreError, UserRecord, UserUpdate};
use fieldops_core::UserId;

const SELECT_USER: &str = r#"
    SELECT id, email, name, password_hash, role, active, last_login
    FROM users
"#;

#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: Arc<PgPool>,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    #[instrument(skip(self), err)]
    pub async fn fetch_active_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE email = $1 AND active = TRUE"))
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_active_by_email", e))?;

        row.map(|r| UserRow::from_row(&r).map_err(|e| map_sqlx_error("find_active_by_email", e)))
            .transpose()?
            .map(UserRecord::try_from)
            .transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    pub async fn fetch_active_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE id = $1 AND active = TRUE"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_active_by_id", e))?;

        row.map(|r| UserRow::from_row(&r).map_err(|e| map_sqlx_error("find_active_by_id", e)))
            .transpose()?
            .map(UserRecord::try_from)
            .transpose()
    }

    #[instrument(skip(self, update), fields(user_id = %id), err)]
    pub async fn write_fields(&self, id: UserId, update: UserUpdate) -> Result<(), StoreError> {
        if update.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            UPDATE users
            SET last_login    = COALESCE($2, last_login),
                password_hash = COALESCE($3, password_hash)
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(update.last_login)
        .bind(update.password_hash.as_ref().map(|h| h.expose().to_string()))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_fields", e))?;

        Ok(())
    }
}

impl CredentialStore for PostgresCredentialStore {
    fn find_active_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        block_on(self.fetch_active_by_email(email))?
    }

    fn find_active_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        block_on(self.fetch_active_by_id(id))?
    }

    fn update_fields(&self, id: UserId, update: UserUpdate) -> Result<(), StoreError> {
        block_on(self.write_fields(id, update))?
    }
}

fn block_on<F: Future>(fut: F) -> Result<F::Output, StoreError> {
    let handle = tokio::runtime::Handle::try_current().map_err(|_| {
        StoreError::Unavailable(
            "PostgresCredentialStore requires a tokio runtime".to_string(),
        )
    })?;
    Ok(tokio::task::block_in_place(|| handle.block_on(fut)))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::Unavailable(format!("database error in {operation}: {}", db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool timed out in {operation}"))
        }
        other => StoreError::Unavailable(format!("{operation}: {other}")),
    }
}

// SQLx row types

#[derive(Debug)]
struct UserRow {
    id: uuid::Uuid,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    active: bool,
    last_login: Option<DateTime<Utc>>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get("role")?,
            active: row.try_get("active")?,
            last_login: row.try_get("last_login")?,
        })
    }
}

impl TryFrom<UserRow> for UserRecord {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("user {}: {e}", row.id)))?;

        Ok(UserRecord {
            id: UserId::from_uuid(row.id),
            email: row.email,
            name: row.name,
            password_hash: PasswordHash::from_stored(row.password_hash),
            role,
            active: row.active,
            last_login: row.last_login,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> UserRow {
        UserRow {
            id: uuid::Uuid::now_v7(),
            email: "a@example.com".into(),
            name: "A".into(),
            password_hash: "$2b$04$abc".into(),
            role: role.into(),
            active: true,
            last_login: None,
        }
    }

    #[test]
    fn maps_known_role() {
        let record = UserRecord::try_from(row("technician")).unwrap();
        assert_eq!(record.role, Role::Technician);
        assert_eq!(record.password_hash.expose(), "$2b$04$abc");
    }

    #[test]
    fn unknown_role_is_corrupt() {
        assert!(matches!(
            UserRecord::try_from(row("superuser")),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn pool_errors_are_unavailable() {
        assert!(matches!(
            map_sqlx_error("find_active_by_id", sqlx::Error::PoolClosed),
            StoreError::Unavailable(_)
        ));
    }
}
