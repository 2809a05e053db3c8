//! Password hashing (bcrypt) and the change-password flow.
//!
//! The salt is embedded in the bcrypt output; nothing else is stored.
//!
//! bcrypt only reads the first 72 bytes of its input. Longer passwords are
//! refused by the policy and never verify, instead of being silently
//! truncated.

use std::sync::OnceLock;

use thiserror::Error;
use tracing::{debug, info, warn};

use fieldops_core::UserId;

use crate::error::AuthError;
use crate::store::{CredentialStore, UserUpdate};

/// A stored password hash. Never printed, never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash read back from the store.
    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Raw hash text, for store implementations that persist it.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },

    #[error("password must be at most {max} bytes")]
    TooLong { max: usize },

    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort { .. } | PasswordError::TooLong { .. } => {
                AuthError::Validation(err.to_string())
            }
            PasswordError::Hash(_) => AuthError::Internal(err.to_string()),
        }
    }
}

/// Longest input bcrypt reads in full.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Plaintext behind the dummy hash used when no user matched.
const ABSENT_USER_PASSWORD: &str = "absent-user-timing-equalizer";

#[derive(Debug, Clone)]
pub struct PasswordManager {
    cost: u32,
    min_length: usize,
    absent_user_hash: OnceLock<PasswordHash>,
}

impl PasswordManager {
    pub fn new(cost: u32, min_length: usize) -> Self {
        Self {
            cost,
            min_length,
            absent_user_hash: OnceLock::new(),
        }
    }

    pub fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordError> {
        bcrypt::non_truncating_hash(plaintext, self.cost)
            .map(PasswordHash)
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Constant-time check of `plaintext` against `hash`.
    ///
    /// An unparseable stored hash, or a plaintext longer than
    /// [`MAX_PASSWORD_BYTES`], verifies as `false`.
    pub fn verify(&self, plaintext: &str, hash: &PasswordHash) -> bool {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        match bcrypt::non_truncating_verify(plaintext, &hash.0) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, "stored password hash could not be parsed");
                false
            }
        }
    }

    /// Spend one bcrypt verification when there is no stored hash to check,
    /// so a miss costs the same as a wrong password. Always `false`.
    pub fn verify_absent(&self, plaintext: &str) -> bool {
        let dummy = self.absent_user_hash.get_or_init(|| {
            self.hash(ABSENT_USER_PASSWORD).unwrap_or_else(|e| {
                warn!(error = %e, "failed to build absent-user hash");
                PasswordHash::from_stored(String::new())
            })
        });
        let _ = self.verify(plaintext, dummy);
        false
    }

    /// Length policy: at least `min_length` characters, at most
    /// [`MAX_PASSWORD_BYTES`] bytes.
    pub fn check_policy(&self, candidate: &str) -> Result<(), PasswordError> {
        if candidate.chars().count() < self.min_length {
            return Err(PasswordError::TooShort {
                min: self.min_length,
            });
        }
        if candidate.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong {
                max: MAX_PASSWORD_BYTES,
            });
        }
        Ok(())
    }

    /// Replace a user's password after re-checking the current one.
    ///
    /// Outstanding tokens stay valid until they expire.
    pub fn change_password<S>(
        &self,
        store: &S,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError>
    where
        S: CredentialStore + ?Sized,
    {
        let Some(user) = store.find_active_by_id(user_id)? else {
            self.verify_absent(current);
            debug!(%user_id, "password change rejected: no active user");
            return Err(AuthError::invalid_credentials());
        };

        if !self.verify(current, &user.password_hash) {
            debug!(%user_id, "password change rejected: current password mismatch");
            return Err(AuthError::invalid_credentials());
        }

        self.check_policy(new)?;

        let hash = self.hash(new)?;
        store.update_fields(user_id, UserUpdate::password_hash(hash))?;

        info!(%user_id, "password changed");
        Ok(())
    }
}
