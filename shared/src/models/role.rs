//! Role Model
//!
//! Roles are a closed enum. The source system passed free-form position
//! strings around; every value observed there maps to exactly one
//! variant here, and unknown strings are rejected at the serde boundary.

use serde::{Deserialize, Serialize};

/// Staff role attached to a credential and embedded in tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Chief,
    Cashier,
    Staff,
}

impl Role {
    /// All roles, in privilege order (highest first)
    pub const ALL: &'static [Role] = &[
        Role::Admin,
        Role::Manager,
        Role::Chief,
        Role::Cashier,
        Role::Staff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Chief => "chief",
            Role::Cashier => "cashier",
            Role::Staff => "staff",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "chief" => Ok(Role::Chief),
            "cashier" => Ok(Role::Cashier),
            "staff" => Ok(Role::Staff),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a role string that is not in the closed set
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);
