//! API-side permission guard.
//!
//! Handlers call this before doing work that needs a capability; the role
//! comes from the principal the middleware just re-read from the store.

use fieldops_auth::{Authorizer, AuthzError, Permission};

use crate::context::PrincipalContext;

pub fn require_permission(principal: &PrincipalContext, tag: &str) -> Result<(), AuthzError> {
    Authorizer::authorize(principal.role(), &Permission::new(tag.to_string()))
}
