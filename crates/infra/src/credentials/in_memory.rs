use std::collections::HashMap;
use std::sync::RwLock;

use fieldops_auth::{CredentialStore, StoreError, UserRecord, UserUpdate};
use fieldops_core::UserId;

/// In-memory user table.
///
/// Intended for tests/dev. Admin helpers (`insert`, `set_active`) stand in for
/// the user-management endpoints that own these rows in production.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user row. Email uniqueness is the caller's concern.
    pub fn insert(&self, user: UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;
        users.insert(user.id, user);
        Ok(())
    }

    /// Flip the active flag. Returns `false` if the user does not exist.
    pub fn set_active(&self, id: UserId, active: bool) -> Result<bool, StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;
        Ok(match users.get_mut(&id) {
            Some(user) => {
                user.active = active;
                true
            }
            None => false,
        })
    }

    /// Raw row lookup, ignoring the active flag.
    pub fn get(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(&id).cloned())
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn find_active_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users
            .values()
            .find(|u| u.active && u.email == email)
            .cloned())
    }

    fn find_active_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(&id).filter(|u| u.active).cloned())
    }

    fn update_fields(&self, id: UserId, update: UserUpdate) -> Result<(), StoreError> {
        if update.is_empty() {
            return Ok(());
        }

        let mut users = self.users.write().map_err(poisoned)?;
        let Some(user) = users.get_mut(&id) else {
            tracing::debug!(user_id = %id, "update_fields: no such user");
            return Ok(());
        };

        if let Some(at) = update.last_login {
            user.last_login = Some(at);
        }
        if let Some(hash) = update.password_hash {
            user.password_hash = hash;
        }
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Unavailable("in-memory user table lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fieldops_auth::{PasswordHash, Role};

    use super::*;

    fn user(email: &str, active: bool) -> UserRecord {
        UserRecord {
            id: UserId::new(),
            email: email.to_string(),
            name: "Someone".to_string(),
            password_hash: PasswordHash::from_stored("$2b$04$placeholder"),
            role: Role::Client,
            active,
            last_login: None,
        }
    }

    #[test]
    fn lookups_skip_inactive_users() {
        let store = InMemoryCredentialStore::new();
        let active = user("a@example.com", true);
        let inactive = user("i@example.com", false);
        store.insert(active.clone()).unwrap();
        store.insert(inactive.clone()).unwrap();

        assert_eq!(store.find_active_by_email("a@example.com").unwrap(), Some(active.clone()));
        assert_eq!(store.find_active_by_email("i@example.com").unwrap(), None);
        assert_eq!(store.find_active_by_id(active.id).unwrap(), Some(active));
        assert_eq!(store.find_active_by_id(inactive.id).unwrap(), None);
        assert!(store.get(inactive.id).unwrap().is_some());
    }

    #[test]
    fn update_touches_only_given_fields() {
        let store = InMemoryCredentialStore::new();
        let u = user("a@example.com", true);
        store.insert(u.clone()).unwrap();

        let at = Utc::now();
        store.update_fields(u.id, UserUpdate::last_login(at)).unwrap();

        let stored = store.get(u.id).unwrap().unwrap();
        assert_eq!(stored.last_login, Some(at));
        assert_eq!(stored.password_hash, u.password_hash);
    }

    #[test]
    fn set_active_reports_missing_user() {
        let store = InMemoryCredentialStore::new();
        assert!(!store.set_active(UserId::new(), false).unwrap());
    }
}
