use serde::{Deserialize, Serialize};

use storerate_core::UserId;

use crate::Role;

/// Identity of an authenticated caller.
///
/// Produced once by the authentication step (verified token claims) and
/// attached to every operation. The core never recomputes it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&crate::JwtClaims> for Identity {
    fn from(claims: &crate::JwtClaims) -> Self {
        Self::new(claims.sub, claims.role)
    }
}
