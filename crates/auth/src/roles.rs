use core::str::FromStr;

use serde::{Deserialize, Serialize};

use storerate_core::DomainError;

/// Closed role model.
///
/// Unlike an open RBAC scheme there are exactly three roles and each maps to a
/// fixed capability set (see [`crate::Operation::policy`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access to all users and stores.
    Admin,
    /// Reads stores and writes only their own ratings.
    User,
    /// Reads and writes only the stores they own; never submits ratings.
    StoreOwner,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::User, Role::StoreOwner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::StoreOwner => "STORE_OWNER",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            "STORE_OWNER" => Ok(Role::StoreOwner),
            _ => Err(DomainError::validation(
                "role",
                "must be one of ADMIN, USER, STORE_OWNER",
            )),
        }
    }
}
