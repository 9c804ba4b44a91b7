use serde::{Deserialize, Serialize};
use std::fmt;

/// Site-wide role of a user.
///
/// The order of variants matters: it defines the privilege hierarchy.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular member.
    #[default]
    User = 0,
    /// May regenerate and upload perk data.
    Admin = 1,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl Role {
    /// Parse a role from a string (case-insensitive).
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Returns `true` if `self` has at least the required role.
    pub fn has_access(&self, required: Role) -> bool {
        *self >= required
    }
}

/// Identity details returned by a sign-in provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInProfile {
    pub provider: String,
    pub subject: String,
    /// Display name to use when creating the account.
    pub username: String,
}
