use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Resource tag (capability) evaluated against a role.
///
/// Tags are opaque strings (e.g. "quotes", "finance-read"). The wildcard `"*"`
/// is only ever produced by [`crate::authorize::Authorizer::capabilities`] for
/// admins; it is never looked up as a tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resource tags known to the business modules.
pub mod resources {
    use super::Permission;

    pub const WILDCARD: Permission = Permission::from_static("*");

    pub const QUOTES: Permission = Permission::from_static("quotes");
    pub const SCHEDULES: Permission = Permission::from_static("schedules");
    pub const CLIENTS: Permission = Permission::from_static("clients");
    pub const REPORTS: Permission = Permission::from_static("reports");
    pub const WARRANTIES: Permission = Permission::from_static("warranties");
    pub const PREVENTIVE_MAINTENANCE: Permission = Permission::from_static("preventive-maintenance");
    pub const FINANCE_READ: Permission = Permission::from_static("finance-read");
    pub const CONTRACTS: Permission = Permission::from_static("contracts");
    pub const AI_ASSIST: Permission = Permission::from_static("ai-assist");

    pub const SCHEDULING: Permission = Permission::from_static("scheduling");
    pub const PRICING_CALCULATOR: Permission = Permission::from_static("pricing-calculator");
    pub const GUIDE: Permission = Permission::from_static("guide");
}
