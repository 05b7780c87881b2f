//! Role gate
//!
//! Decides allow/deny for a verified caller against an operation's
//! allowed-role set. The gate itself is stateless; which roles an
//! operation accepts comes from the deployment's [`AccessPolicy`],
//! never from hard-coded strings at the call site.

use shared::Role;

use super::AuthError;
use crate::security_log;

/// Named set of roles allowed to perform one operation
#[derive(Debug, Clone)]
pub struct RoleSet {
    operation: &'static str,
    roles: Vec<Role>,
}

impl RoleSet {
    pub fn new(operation: &'static str, roles: impl Into<Vec<Role>>) -> Self {
        Self {
            operation,
            roles: roles.into(),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn contains(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Allow iff the caller's role is in the operation's allowed set
pub fn authorize(
    identity: &super::CallerIdentity,
    allowed: &RoleSet,
) -> Result<(), AuthError> {
    if allowed.contains(identity.role) {
        return Ok(());
    }

    security_log!(
        "WARN",
        "role_denied",
        user_id = identity.user_id.clone(),
        username = identity.username.clone(),
        role = identity.role.as_str(),
        operation = allowed.operation
    );

    Err(AuthError::InsufficientRole {
        role: identity.role,
        operation: allowed.operation,
    })
}

/// Per-operation allowed-role sets for one deployment
///
/// Versioned so a deployment can tell which mapping it is running;
/// `POLICY_*` environment variables override individual sets with a
/// comma-separated role list (e.g. `POLICY_ORDERS_CREATE=admin,manager,cashier`).
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    pub version: u32,
    pub catalog_write: RoleSet,
    pub restock: RoleSet,
    pub orders_create: RoleSet,
    pub orders_read: RoleSet,
    pub orders_update: RoleSet,
    pub users_manage: RoleSet,
}

impl AccessPolicy {
    /// Baseline mapping (policy version 1)
    ///
    /// Catalog and user management are admin-only; order operations and
    /// restocking are open to admins and managers.
    pub fn v1() -> Self {
        use Role::*;
        Self {
            version: 1,
            catalog_write: RoleSet::new("manage the catalog", [Admin]),
            restock: RoleSet::new("restock items", [Admin, Manager]),
            orders_create: RoleSet::new("place orders", [Admin, Manager]),
            orders_read: RoleSet::new("read orders", [Admin, Manager]),
            orders_update: RoleSet::new("update orders", [Admin, Manager]),
            users_manage: RoleSet::new("manage users", [Admin]),
        }
    }

    /// Baseline policy with environment overrides applied
    pub fn from_env() -> Self {
        let mut policy = Self::v1();
        override_from_env(&mut policy.catalog_write, "POLICY_CATALOG_WRITE");
        override_from_env(&mut policy.restock, "POLICY_RESTOCK");
        override_from_env(&mut policy.orders_create, "POLICY_ORDERS_CREATE");
        override_from_env(&mut policy.orders_read, "POLICY_ORDERS_READ");
        override_from_env(&mut policy.orders_update, "POLICY_ORDERS_UPDATE");
        override_from_env(&mut policy.users_manage, "POLICY_USERS_MANAGE");
        policy
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::v1()
    }
}

/// Replace a role set from a comma-separated env list, if set
///
/// Unknown role names invalidate the whole override; the baseline set
/// is kept and a warning logged, rather than silently shrinking access.
fn override_from_env(set: &mut RoleSet, var: &str) {
    let Ok(value) = std::env::var(var) else {
        return;
    };

    let parsed: Result<Vec<Role>, _> = value
        .split(',')
        .map(|s| s.trim().parse::<Role>())
        .collect();

    match parsed {
        Ok(roles) if !roles.is_empty() => {
            *set = RoleSet::new(set.operation, roles);
        }
        _ => {
            tracing::warn!(var, value, "ignoring invalid role list override");
        }
    }
}
