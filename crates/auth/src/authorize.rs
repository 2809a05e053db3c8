use serde::Serialize;
use thiserror::Error;

use crate::permissions::resources::*;
use crate::{Permission, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{role}' lacks permission '{permission}'")]
    Forbidden { role: Role, permission: String },
}

/// What a role is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grants {
    /// Every tag, including ones added after this table was written.
    All,
    /// Exactly the enumerated tags; everything else is denied.
    Only(&'static [Permission]),
}

const TECHNICIAN_GRANTS: &[Permission] = &[
    QUOTES,
    SCHEDULES,
    CLIENTS,
    REPORTS,
    WARRANTIES,
    PREVENTIVE_MAINTENANCE,
    FINANCE_READ,
    CONTRACTS,
    AI_ASSIST,
];

const CLIENT_GRANTS: &[Permission] = &[SCHEDULING, PRICING_CALCULATOR, GUIDE];

/// The role→capability table. This is the only place grants are defined.
pub const CAPABILITY_TABLE: [(Role, Grants); 3] = [
    (Role::Admin, Grants::All),
    (Role::Technician, Grants::Only(TECHNICIAN_GRANTS)),
    (Role::Client, Grants::Only(CLIENT_GRANTS)),
];

/// Static role-based permission evaluation.
///
/// - No IO
/// - No caching, no per-user overrides
/// - Unknown combinations are denied
#[derive(Debug, Clone, Copy, Default)]
pub struct Authorizer;

impl Authorizer {
    pub fn grants(role: Role) -> Grants {
        CAPABILITY_TABLE
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, g)| *g)
            .unwrap_or(Grants::Only(&[]))
    }

    pub fn has_permission(role: Role, tag: &str) -> bool {
        match Self::grants(role) {
            Grants::All => true,
            Grants::Only(tags) => tags.iter().any(|p| p.as_str() == tag),
        }
    }

    /// Like [`Authorizer::has_permission`], but produces an error callers can
    /// surface as a 403.
    pub fn authorize(role: Role, required: &Permission) -> Result<(), AuthzError> {
        if Self::has_permission(role, required.as_str()) {
            Ok(())
        } else {
            Err(AuthzError::Forbidden {
                role,
                permission: required.as_str().to_string(),
            })
        }
    }

    /// Capabilities of a role, for display. Admins get the wildcard only.
    pub fn capabilities(role: Role) -> Capabilities {
        match Self::grants(role) {
            Grants::All => Capabilities {
                role,
                all: true,
                capabilities: vec![WILDCARD],
            },
            Grants::Only(tags) => Capabilities {
                role,
                all: false,
                capabilities: tags.to_vec(),
            },
        }
    }
}

/// Serializable view of a role's grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub role: Role,
    pub all: bool,
    pub capabilities: Vec<Permission>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_matches_any_tag() {
        for tag in ["quotes", "finance-read", "guide", "something-new", ""] {
            assert!(Authorizer::has_permission(Role::Admin, tag), "tag {tag}");
        }
    }

    #[test]
    fn client_grants_are_enumerated() {
        assert!(Authorizer::has_permission(Role::Client, "scheduling"));
        assert!(Authorizer::has_permission(Role::Client, "pricing-calculator"));
        assert!(Authorizer::has_permission(Role::Client, "guide"));
        assert!(!Authorizer::has_permission(Role::Client, "finance-read"));
        assert!(!Authorizer::has_permission(Role::Client, "quotes"));
    }

    #[test]
    fn technician_grants_are_enumerated() {
        for tag in TECHNICIAN_GRANTS {
            assert!(Authorizer::has_permission(Role::Technician, tag.as_str()));
        }
        assert!(!Authorizer::has_permission(Role::Technician, "scheduling"));
        assert!(!Authorizer::has_permission(Role::Technician, "users"));
    }

    #[test]
    fn wildcard_is_not_a_tag_for_non_admins() {
        assert!(!Authorizer::has_permission(Role::Technician, "*"));
        assert!(!Authorizer::has_permission(Role::Client, "*"));
    }

    #[test]
    fn authorize_reports_missing_permission() {
        let err = Authorizer::authorize(Role::Client, &FINANCE_READ).unwrap_err();
        assert_eq!(
            err,
            AuthzError::Forbidden {
                role: Role::Client,
                permission: "finance-read".to_string()
            }
        );
        assert!(Authorizer::authorize(Role::Technician, &FINANCE_READ).is_ok());
    }

    #[test]
    fn capabilities_for_display() {
        let admin = Authorizer::capabilities(Role::Admin);
        assert!(admin.all);
        assert!(admin.capabilities.iter().all(|p| p.is_wildcard()));

        let client = Authorizer::capabilities(Role::Client);
        assert!(!client.all);
        assert_eq!(client.capabilities.len(), 3);
    }

    #[test]
    fn every_role_has_a_table_entry() {
        for role in Role::ALL {
            assert!(CAPABILITY_TABLE.iter().any(|(r, _)| *r == role));
        }
    }
}
