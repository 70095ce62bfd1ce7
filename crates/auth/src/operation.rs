use serde::Serialize;

use crate::Role;

/// Every operation exposed by the rating service.
///
/// Each variant carries a declarative [`Policy`]; guards are composed from
/// these rather than from per-handler role checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    CreateUser,
    ListUsers,
    GetUser,
    CreateStore,
    ListStores,
    GetStore,
    UpdateStore,
    SubmitRating,
    UpdateRating,
    GetUserRating,
    GetStoreRatings,
    DashboardStats,
    OwnerDashboard,
    ListOwnedStores,
    ChangePassword,
}

/// Who may perform an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub allowed_roles: &'static [Role],
    /// When set, non-admin callers must own the target store.
    pub requires_ownership: bool,
}

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const ADMIN_OR_OWNER: &[Role] = &[Role::Admin, Role::StoreOwner];
const ANY_ROLE: &[Role] = &Role::ALL;
const RATERS: &[Role] = &[Role::User];
const OWNERS: &[Role] = &[Role::StoreOwner];

impl Operation {
    pub const ALL: [Operation; 15] = [
        Operation::CreateUser,
        Operation::ListUsers,
        Operation::GetUser,
        Operation::CreateStore,
        Operation::ListStores,
        Operation::GetStore,
        Operation::UpdateStore,
        Operation::SubmitRating,
        Operation::UpdateRating,
        Operation::GetUserRating,
        Operation::GetStoreRatings,
        Operation::DashboardStats,
        Operation::OwnerDashboard,
        Operation::ListOwnedStores,
        Operation::ChangePassword,
    ];

    pub const fn policy(self) -> Policy {
        let (allowed_roles, requires_ownership) = match self {
            Operation::CreateUser
            | Operation::ListUsers
            | Operation::GetUser
            | Operation::DashboardStats => (ADMIN_ONLY, false),
            Operation::CreateStore | Operation::UpdateStore => (ADMIN_OR_OWNER, true),
            Operation::ListStores
            | Operation::GetStore
            | Operation::GetStoreRatings
            | Operation::ChangePassword => (ANY_ROLE, false),
            Operation::SubmitRating | Operation::UpdateRating | Operation::GetUserRating => {
                (RATERS, false)
            }
            Operation::OwnerDashboard | Operation::ListOwnedStores => (OWNERS, false),
        };
        Policy {
            allowed_roles,
            requires_ownership,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateUser => "create_user",
            Operation::ListUsers => "list_users",
            Operation::GetUser => "get_user",
            Operation::CreateStore => "create_store",
            Operation::ListStores => "list_stores",
            Operation::GetStore => "get_store",
            Operation::UpdateStore => "update_store",
            Operation::SubmitRating => "submit_rating",
            Operation::UpdateRating => "update_rating",
            Operation::GetUserRating => "get_user_rating",
            Operation::GetStoreRatings => "get_store_ratings",
            Operation::DashboardStats => "dashboard_stats",
            Operation::OwnerDashboard => "owner_dashboard",
            Operation::ListOwnedStores => "list_owned_stores",
            Operation::ChangePassword => "change_password",
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
