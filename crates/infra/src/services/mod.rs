//! Application services.
//!
//! Each operation runs the same pipeline:
//!
//! ```text
//! Identity + input
//!   ↓
//! 1. Authorize (pure, no storage)
//!   ↓
//! 2. Validate input (pure, no storage)
//!   ↓
//! 3. Read / write through the Repository
//!   ↓
//! 4. Aggregate ratings into projections (reads only)
//! ```
//!
//! A denied or invalid request therefore never reaches a write.

pub mod accounts;
pub mod dashboard;
pub mod ratings;
pub mod stores;
pub mod users;

use std::collections::HashMap;
use std::sync::Arc;

use storerate_auth::{AuthzError, CredentialHasher, Hs256Jwt, Identity, Operation, authorize};
use storerate_catalog::User;
use storerate_core::{DomainResult, UserId};

use crate::repository::Repository;

pub use accounts::{AccountService, Session};
pub use dashboard::DashboardService;
pub use ratings::RatingEngine;
pub use stores::StoreService;
pub use users::UserService;

/// Every service, wired to one repository.
#[derive(Clone)]
pub struct Services {
    pub ratings: RatingEngine,
    pub stores: StoreService,
    pub users: UserService,
    pub accounts: AccountService,
    pub dashboard: DashboardService,
}

impl Services {
    pub fn new(
        repo: Arc<dyn Repository>,
        hasher: Arc<dyn CredentialHasher>,
        jwt: Arc<Hs256Jwt>,
    ) -> Self {
        Self {
            ratings: RatingEngine::new(repo.clone()),
            stores: StoreService::new(repo.clone()),
            users: UserService::new(repo.clone(), hasher.clone()),
            accounts: AccountService::new(repo.clone(), hasher, jwt),
            dashboard: DashboardService::new(repo),
        }
    }
}

/// Authorize, logging denials.
pub(crate) fn guard(
    identity: Option<&Identity>,
    operation: Operation,
    resource_owner: Option<UserId>,
) -> DomainResult<Identity> {
    authorize(identity, operation, resource_owner).map_err(|err| {
        log_denial(identity, &err);
        err.into()
    })
}

/// Role-only check for operations whose target owner is not known until the
/// target is loaded. Ownership is assumed here and checked again with
/// [`guard`] once the owner is known.
pub(crate) fn guard_role(identity: Option<&Identity>, operation: Operation) -> DomainResult<Identity> {
    guard(identity, operation, identity.map(|i| i.user_id))
}

fn log_denial(identity: Option<&Identity>, err: &AuthzError) {
    match identity {
        Some(id) => tracing::debug!(user_id = %id.user_id, role = %id.role, reason = %err, "access denied"),
        None => tracing::debug!(reason = %err, "access denied"),
    }
}

/// Load `ids` into a lookup map, skipping unknown ids.
pub(crate) async fn users_by_id(
    repo: &dyn Repository,
    ids: impl IntoIterator<Item = UserId>,
) -> DomainResult<HashMap<UserId, User>> {
    let mut ids: Vec<UserId> = ids.into_iter().collect();
    ids.sort();
    ids.dedup();
    Ok(repo
        .users_by_ids(&ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the service tests.

    use std::sync::Arc;

    use storerate_auth::{CredentialError, CredentialHasher, Hs256Jwt, Identity, Role};
    use storerate_catalog::{NewStore, NewUser, Store, User};

    use super::Services;
    use crate::repository::{InMemoryRepository, Repository};

    /// Reversible stand-in for Argon2 so tests stay fast.
    #[derive(Debug, Default)]
    pub struct PlainHasher;

    impl CredentialHasher for PlainHasher {
        fn hash(&self, plain: &str) -> Result<String, CredentialError> {
            Ok(format!("plain:{plain}"))
        }

        fn verify(&self, plain: &str, hash: &str) -> Result<bool, CredentialError> {
            hash.strip_prefix("plain:")
                .map(|stored| stored == plain)
                .ok_or(CredentialError::MalformedHash)
        }
    }

    pub struct Fixture {
        pub services: Services,
        pub repo: Arc<InMemoryRepository>,
        pub admin: Identity,
    }

    impl Fixture {
        pub async fn new() -> Self {
            let repo = Arc::new(InMemoryRepository::new());
            let jwt = Arc::new(Hs256Jwt::new(
                b"fixture-secret-fixture-secret-fixture",
                chrono::Duration::minutes(30),
            ));
            let services = Services::new(repo.clone(), Arc::new(PlainHasher), jwt);

            // Bootstrap admin straight through the repository.
            let admin = User {
                id: storerate_core::UserId::new(),
                name: "System Administrator Account".into(),
                email: "admin@stores.com".into(),
                address: "123 Admin Street".into(),
                role: Role::Admin,
                credential_hash: "plain:Admin123!".into(),
                created_at: chrono::Utc::now(),
            };
            let admin = repo.insert_user(admin).await.unwrap();

            Self {
                services,
                repo,
                admin: Identity::new(admin.id, Role::Admin),
            }
        }

        pub async fn user(&self, name: &str, email: &str, role: Role) -> Identity {
            let profile = self
                .services
                .users
                .create_user(
                    Some(&self.admin),
                    NewUser {
                        name: name.into(),
                        email: email.into(),
                        address: "456 User Avenue, User City".into(),
                        credential: "User123!".into(),
                        role,
                    },
                )
                .await
                .unwrap();
            Identity::new(profile.id, role)
        }

        pub async fn store(&self, name: &str, email: &str, owner: &Identity) -> Store {
            self.services
                .stores
                .create_store(
                    Some(&self.admin),
                    NewStore {
                        name: name.into(),
                        email: email.into(),
                        address: "100 Tech Plaza, Electronics District".into(),
                        owner_id: owner.user_id,
                    },
                )
                .await
                .unwrap()
        }
    }
}
