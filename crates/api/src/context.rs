use fieldops_auth::{PublicUser, Role};
use fieldops_core::UserId;

/// Principal context for a request (the freshly re-read, active user).
///
/// Inserted by the auth middleware; present on every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user: PublicUser,
}

impl PrincipalContext {
    pub fn new(user: PublicUser) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn user(&self) -> &PublicUser {
        &self.user
    }
}
