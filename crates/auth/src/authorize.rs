use serde::Serialize;
use thiserror::Error;

use storerate_core::{DomainError, UserId};

use crate::{Identity, Operation, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("role {role} may not perform {operation}")]
    RoleNotPermitted { operation: Operation, role: Role },

    #[error("{operation} requires ownership of the target store")]
    NotOwner { operation: Operation },
}

impl From<AuthzError> for DomainError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => DomainError::Unauthenticated,
            other => DomainError::forbidden(other.to_string()),
        }
    }
}

/// Admit or deny `identity` for `operation`.
///
/// `resource_owner` is the owner of the store the operation targets; it is
/// only consulted for operations whose policy requires ownership, and admins
/// bypass it.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(
    identity: Option<&Identity>,
    operation: Operation,
    resource_owner: Option<UserId>,
) -> Result<Identity, AuthzError> {
    let identity = identity.ok_or(AuthzError::Unauthenticated)?;
    let policy = operation.policy();

    if !policy.allowed_roles.contains(&identity.role) {
        return Err(AuthzError::RoleNotPermitted {
            operation,
            role: identity.role,
        });
    }

    if policy.requires_ownership
        && !identity.is_admin()
        && resource_owner != Some(identity.user_id)
    {
        return Err(AuthzError::NotOwner { operation });
    }

    Ok(*identity)
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub operation: Operation,
    pub granted: bool,
    /// Human-readable reason for the decision.
    pub reason: String,
    pub allowed_roles: Vec<Role>,
    pub requires_ownership: bool,
    pub denial: Option<DenialKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    Unauthenticated,
    RoleNotPermitted,
    NotOwner,
}

/// Explain why `authorize` would admit or deny the same inputs.
pub fn explain_authorization(
    identity: Option<&Identity>,
    operation: Operation,
    resource_owner: Option<UserId>,
) -> AuthorizationExplanation {
    let policy = operation.policy();
    let decision = authorize(identity, operation, resource_owner);

    let (granted, reason, denial) = match decision {
        Ok(id) if policy.requires_ownership && id.is_admin() => (
            true,
            "admin bypasses the ownership check".to_string(),
            None,
        ),
        Ok(id) if policy.requires_ownership => (
            true,
            format!("{} owns the target store", id.user_id),
            None,
        ),
        Ok(id) => (true, format!("role {} is permitted", id.role), None),
        Err(e @ AuthzError::Unauthenticated) => {
            (false, e.to_string(), Some(DenialKind::Unauthenticated))
        }
        Err(e @ AuthzError::RoleNotPermitted { .. }) => {
            (false, e.to_string(), Some(DenialKind::RoleNotPermitted))
        }
        Err(e @ AuthzError::NotOwner { .. }) => (false, e.to_string(), Some(DenialKind::NotOwner)),
    };

    AuthorizationExplanation {
        operation,
        granted,
        reason,
        allowed_roles: policy.allowed_roles.to_vec(),
        requires_ownership: policy.requires_ownership,
        denial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_role(role: Role) -> Identity {
        Identity::new(UserId::new(), role)
    }

    #[test]
    fn missing_identity_is_unauthenticated_for_every_operation() {
        for op in Operation::ALL {
            assert_eq!(authorize(None, op, None), Err(AuthzError::Unauthenticated));
        }
    }

    #[test]
    fn user_is_denied_every_admin_operation() {
        let user = as_role(Role::User);
        for op in [
            Operation::CreateUser,
            Operation::ListUsers,
            Operation::GetUser,
            Operation::DashboardStats,
        ] {
            let err = authorize(Some(&user), op, None).unwrap_err();
            assert!(matches!(err, AuthzError::RoleNotPermitted { .. }), "{op}");
            assert!(matches!(DomainError::from(err), DomainError::Forbidden(_)));
        }
    }

    #[test]
    fn only_users_submit_ratings() {
        let owner = as_role(Role::StoreOwner);
        let admin = as_role(Role::Admin);
        let user = as_role(Role::User);

        assert!(authorize(Some(&owner), Operation::SubmitRating, None).is_err());
        assert!(authorize(Some(&admin), Operation::SubmitRating, None).is_err());
        assert!(authorize(Some(&user), Operation::SubmitRating, None).is_ok());
        assert!(authorize(Some(&owner), Operation::UpdateRating, None).is_err());
    }

    #[test]
    fn owner_must_own_the_store_to_update_it() {
        let owner = as_role(Role::StoreOwner);
        let someone_else = UserId::new();

        assert!(authorize(Some(&owner), Operation::UpdateStore, Some(owner.user_id)).is_ok());
        assert_eq!(
            authorize(Some(&owner), Operation::UpdateStore, Some(someone_else)),
            Err(AuthzError::NotOwner {
                operation: Operation::UpdateStore
            })
        );
        assert!(authorize(Some(&owner), Operation::UpdateStore, None).is_err());
    }

    #[test]
    fn admin_bypasses_ownership() {
        let admin = as_role(Role::Admin);
        assert!(authorize(Some(&admin), Operation::UpdateStore, Some(UserId::new())).is_ok());
        assert!(authorize(Some(&admin), Operation::CreateStore, Some(UserId::new())).is_ok());
    }

    #[test]
    fn user_cannot_update_stores_even_if_named_owner() {
        let user = as_role(Role::User);
        let err = authorize(Some(&user), Operation::UpdateStore, Some(user.user_id)).unwrap_err();
        assert!(matches!(err, AuthzError::RoleNotPermitted { .. }));
    }

    #[test]
    fn every_role_can_list_stores() {
        for role in Role::ALL {
            assert!(authorize(Some(&as_role(role)), Operation::ListStores, None).is_ok());
        }
    }

    #[test]
    fn explanation_matches_decision() {
        let owner = as_role(Role::StoreOwner);
        let e = explain_authorization(Some(&owner), Operation::UpdateStore, Some(UserId::new()));
        assert!(!e.granted);
        assert_eq!(e.denial, Some(DenialKind::NotOwner));
        assert!(e.requires_ownership);

        let admin = as_role(Role::Admin);
        let e = explain_authorization(Some(&admin), Operation::UpdateStore, Some(UserId::new()));
        assert!(e.granted);
        assert!(e.reason.contains("bypasses"));

        let e = explain_authorization(None, Operation::ListStores, None);
        assert_eq!(e.denial, Some(DenialKind::Unauthenticated));
    }
}
