//! Credential store contract (consumed, not owned, by this crate).
//!
//! Implementations live in `fieldops-infra`. Every lookup filters on the
//! active flag; callers never see inactive accounts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use fieldops_core::UserId;

use crate::Role;
use crate::password::PasswordHash;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or the query failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A row could not be mapped to a [`UserRecord`] (e.g. unknown role).
    #[error("corrupt user record: {0}")]
    Corrupt(String),
}

/// A user row as held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: PasswordHash,
    pub role: Role,
    pub active: bool,
    pub last_login: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            last_login: self.last_login,
        }
    }
}

/// The subset of a user that may leave the auth core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub last_login: Option<DateTime<Utc>>,
}

/// Fields this crate is allowed to write. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub last_login: Option<DateTime<Utc>>,
    pub password_hash: Option<PasswordHash>,
}

impl UserUpdate {
    pub fn last_login(at: DateTime<Utc>) -> Self {
        Self {
            last_login: Some(at),
            ..Default::default()
        }
    }

    pub fn password_hash(hash: PasswordHash) -> Self {
        Self {
            password_hash: Some(hash),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last_login.is_none() && self.password_hash.is_none()
    }
}

/// Single-row reads and writes against the user table.
///
/// Writes are last-write-wins; no transaction spans two calls.
pub trait CredentialStore: Send + Sync {
    fn find_active_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    fn find_active_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;

    fn update_fields(&self, id: UserId, update: UserUpdate) -> Result<(), StoreError>;
}

impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    fn find_active_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        (**self).find_active_by_email(email)
    }

    fn find_active_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        (**self).find_active_by_id(id)
    }

    fn update_fields(&self, id: UserId, update: UserUpdate) -> Result<(), StoreError> {
        (**self).update_fields(id, update)
    }
}
