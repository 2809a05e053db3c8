//! Login, per-request identity resolution and token refresh.
//!
//! There is no session cache: every authenticated request re-reads the user
//! from the credential store, so deactivating an account takes effect on the
//! very next request even while its tokens still verify.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use fieldops_core::UserId;

use crate::claims::Claims;
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthFailure};
use crate::password::PasswordManager;
use crate::store::{CredentialStore, PublicUser, StoreError, UserRecord, UserUpdate};
use crate::token::TokenCodec;

/// A freshly issued token together with the user it was issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user: PublicUser,
    pub token: String,
}

pub struct Authenticator<S> {
    store: S,
    codec: TokenCodec,
    passwords: PasswordManager,
    token_ttl: Duration,
}

impl<S: CredentialStore> Authenticator<S> {
    pub fn new(store: S, config: &AuthConfig) -> Result<Self, AuthError> {
        Ok(Self {
            store,
            codec: TokenCodec::new(&config.secret)?,
            passwords: PasswordManager::new(config.bcrypt_cost, config.min_password_length),
            token_ttl: config.token_ttl,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Verify email + password and issue a token.
    ///
    /// Unknown email, inactive account and wrong password all fail with the
    /// same error.
    pub fn login(&self, email: &str, password: &str, now: DateTime<Utc>) -> Result<Session, AuthError> {
        let Some(user) = self.store.find_active_by_email(email)? else {
            self.passwords.verify_absent(password);
            debug!(email, "login rejected: no active user for email");
            return Err(AuthError::invalid_credentials());
        };

        if !self.passwords.verify(password, &user.password_hash) {
            debug!(user_id = %user.id, "login rejected: password mismatch");
            return Err(AuthError::invalid_credentials());
        }

        let token = self.issue(&user, now)?;

        // Best effort: a failed write does not void the token.
        if let Err(e) = self.store.update_fields(user.id, UserUpdate::last_login(now)) {
            warn!(user_id = %user.id, error = %e, "failed to record last login");
        }

        info!(user_id = %user.id, role = %user.role, "login succeeded");
        Ok(Session {
            user: user.to_public(),
            token,
        })
    }

    /// Resolve the caller from an `Authorization` header value.
    ///
    /// `Ok(None)` means unauthenticated: missing/ill-formed header, a token
    /// that fails to decode, or a subject that is no longer active.
    /// Only store failures are errors.
    pub fn resolve_user(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<PublicUser>, StoreError> {
        Ok(self
            .resolve_record(authorization, now)?
            .map(|user| user.to_public()))
    }

    /// Issue a new token for the caller without asking for the password again.
    pub fn refresh(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, AuthError> {
        let Some(user) = self.resolve_record(authorization, now)? else {
            return Ok(None);
        };

        let token = self.issue(&user, now)?;
        debug!(user_id = %user.id, "token refreshed");
        Ok(Some(Session {
            user: user.to_public(),
            token,
        }))
    }

    pub fn change_password(&self, user_id: UserId, current: &str, new: &str) -> Result<(), AuthError> {
        self.passwords
            .change_password(&self.store, user_id, current, new)
    }

    fn issue(&self, user: &UserRecord, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims::issue(user.id, user.email.clone(), user.role, now, self.token_ttl)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(self.codec.encode(&claims)?)
    }

    fn resolve_record(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<UserRecord>, StoreError> {
        let Some(token) = authorization.and_then(extract_bearer) else {
            return Ok(None);
        };

        let claims = match self.codec.decode(token, now) {
            Ok(claims) => claims,
            Err(e) => {
                let failure = match AuthError::from(e) {
                    AuthError::Authentication(f) => f,
                    _ => AuthFailure::MalformedToken,
                };
                debug!(reason = failure.as_str(), "bearer token rejected");
                return Ok(None);
            }
        };

        // Mandatory re-read: the token alone is not enough.
        match self.store.find_active_by_id(claims.sub)? {
            Some(user) => Ok(Some(user)),
            None => {
                debug!(
                    user_id = %claims.sub,
                    reason = AuthFailure::InactiveUser.as_str(),
                    "bearer token rejected"
                );
                Ok(None)
            }
        }
    }
}

/// Extract the token from `Bearer <token>` (scheme is case-insensitive).
pub fn extract_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::RwLock;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;
    use crate::Role;
    use crate::password::PasswordHash;
    use chrono::TimeZone;

    #[derive(Default)]
    struct StubStore {
        users: RwLock<HashMap<UserId, UserRecord>>,
        fail_writes: bool,
        fail_reads: AtomicBool,
        reads: AtomicUsize,
    }

    impl StubStore {
        fn read(&self) -> Result<(), StoreError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("connection refused".into()));
            }
            Ok(())
        }
    }

    impl CredentialStore for StubStore {
        fn find_active_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
            self.read()?;
            let users = self.users.read().unwrap();
            Ok(users.values().find(|u| u.active && u.email == email).cloned())
        }

        fn find_active_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
            self.read()?;
            let users = self.users.read().unwrap();
            Ok(users.get(&id).filter(|u| u.active).cloned())
        }

        fn update_fields(&self, id: UserId, update: UserUpdate) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(StoreError::Unavailable("read-only replica".into()));
            }
            let mut users = self.users.write().unwrap();
            if let Some(u) = users.get_mut(&id) {
                if let Some(at) = update.last_login {
                    u.last_login = Some(at);
                }
                if let Some(hash) = update.password_hash {
                    u.password_hash = hash;
                }
            }
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn config() -> AuthConfig {
        AuthConfig::new("unit-secret")
            .with_bcrypt_cost(4)
            .with_token_ttl(Duration::hours(1))
    }

    fn setup(fail_writes: bool) -> (Authenticator<StubStore>, UserId) {
        let id = UserId::new();
        let hash: PasswordHash = PasswordManager::new(4, 6).hash("hunter22").unwrap();
        let store = StubStore {
            fail_writes,
            ..Default::default()
        };
        store.users.write().unwrap().insert(
            id,
            UserRecord {
                id,
                email: "tech@example.com".into(),
                name: "Tech".into(),
                password_hash: hash,
                role: Role::Technician,
                active: true,
                last_login: None,
            },
        );
        (Authenticator::new(store, &config()).unwrap(), id)
    }

    #[test]
    fn extract_bearer_accepts_any_case() {
        assert_eq!(extract_bearer("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer("BEARER   abc  "), Some("abc"));
    }

    #[test]
    fn extract_bearer_rejects_other_shapes() {
        assert_eq!(extract_bearer("Basic abc"), None);
        assert_eq!(extract_bearer("Bearer"), None);
        assert_eq!(extract_bearer("Bearer    "), None);
        assert_eq!(extract_bearer("abc"), None);
        assert_eq!(extract_bearer(""), None);
    }

    #[test]
    fn login_records_last_login_and_hides_hash() {
        let (auth, id) = setup(false);
        let session = auth.login("tech@example.com", "hunter22", now()).unwrap();

        assert_eq!(session.user.id, id);
        let json = serde_json::to_value(&session).unwrap();
        assert!(json["user"].get("password_hash").is_none());

        let stored = auth.store().find_active_by_id(id).unwrap().unwrap();
        assert_eq!(stored.last_login, Some(now()));
    }

    #[test]
    fn login_survives_failed_last_login_write() {
        let (auth, _) = setup(true);
        assert!(auth.login("tech@example.com", "hunter22", now()).is_ok());
    }

    #[test]
    fn login_failures_are_indistinguishable() {
        let (auth, _) = setup(false);
        let unknown = auth.login("nobody@example.com", "hunter22", now()).unwrap_err();
        let wrong = auth.login("tech@example.com", "hunter23", now()).unwrap_err();

        assert!(matches!(unknown, AuthError::Authentication(AuthFailure::InvalidCredentials)));
        assert!(matches!(wrong, AuthError::Authentication(AuthFailure::InvalidCredentials)));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[test]
    fn resolve_user_without_header_is_unauthenticated() {
        let (auth, _) = setup(false);
        assert_eq!(auth.resolve_user(None, now()).unwrap(), None);
        assert_eq!(auth.resolve_user(Some("Token xyz"), now()).unwrap(), None);
        assert_eq!(auth.resolve_user(Some("Bearer not.a.token"), now()).unwrap(), None);
        assert_eq!(auth.resolve_user(Some("Bearer two.parts"), now()).unwrap(), None);
    }

    #[test]
    fn refresh_issues_a_later_token() {
        let (auth, id) = setup(false);
        let session = auth.login("tech@example.com", "hunter22", now()).unwrap();
        let header = format!("Bearer {}", session.token);

        let later = now() + Duration::minutes(30);
        let refreshed = auth.refresh(Some(&header), later).unwrap().unwrap();
        assert_eq!(refreshed.user.id, id);

        let claims = auth.codec().decode(&refreshed.token, later).unwrap();
        assert_eq!(claims.iat, later);
        assert_eq!(claims.exp, later + Duration::hours(1));
    }

    #[test]
    fn store_outage_propagates_without_retry() {
        let (auth, id) = setup(false);
        let session = auth.login("tech@example.com", "hunter22", now()).unwrap();
        let header = format!("Bearer {}", session.token);

        auth.store().fail_reads.store(true, Ordering::SeqCst);
        auth.store().reads.store(0, Ordering::SeqCst);

        assert!(matches!(
            auth.login("tech@example.com", "hunter22", now()),
            Err(AuthError::Store(StoreError::Unavailable(_)))
        ));
        assert!(matches!(
            auth.resolve_user(Some(&header), now()),
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            auth.refresh(Some(&header), now()),
            Err(AuthError::Store(StoreError::Unavailable(_)))
        ));
        assert!(matches!(
            auth.change_password(id, "hunter22", "newpass1"),
            Err(AuthError::Store(StoreError::Unavailable(_)))
        ));

        // One read per call, no retries.
        assert_eq!(auth.store().reads.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn unrepresentable_expiry_is_an_internal_error() {
        let (auth, _) = setup(false);
        let auth = Authenticator::new(
            auth.store,
            &config().with_token_ttl(Duration::try_seconds(9_000_000_000_000).unwrap()),
        )
        .unwrap();

        assert!(matches!(
            auth.login("tech@example.com", "hunter22", now()),
            Err(AuthError::Internal(_))
        ));
    }

    #[test]
    fn refresh_requires_valid_token() {
        let (auth, _) = setup(false);
        assert_eq!(auth.refresh(Some("Bearer junk"), now()).unwrap(), None);
        assert_eq!(auth.refresh(None, now()).unwrap(), None);
    }
}
