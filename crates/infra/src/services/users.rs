//! Administrative user management.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use storerate_auth::{CredentialHasher, Identity, Operation};
use storerate_catalog::{
    NewUser, RatingStats, Store, User, UserListing, UserProfile, UserQuery, stats_by_store,
};
use storerate_core::{DomainError, DomainResult, StoreId, UserId};

use super::guard;
use crate::repository::Repository;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn Repository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserService {
    pub fn new(repo: Arc<dyn Repository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { repo, hasher }
    }

    /// Create an account of any role.
    #[instrument(skip(self, identity, input), fields(role = %input.role), err)]
    pub async fn create_user(
        &self,
        identity: Option<&Identity>,
        input: NewUser,
    ) -> DomainResult<UserProfile> {
        guard(identity, Operation::CreateUser, None)?;
        let input = input.validated()?;
        let user = insert_new_user(self.repo.as_ref(), self.hasher.as_ref(), input).await?;
        Ok(UserProfile::from(&user))
    }

    pub async fn list_users(
        &self,
        identity: Option<&Identity>,
        query: &UserQuery,
    ) -> DomainResult<Vec<UserListing>> {
        guard(identity, Operation::ListUsers, None)?;

        let users = self.repo.list_users(query).await?;
        let ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
        let owned = self.owned_stores(&ids).await?;

        Ok(users.iter().map(|u| listing(u, &owned)).collect())
    }

    pub async fn get_user(&self, identity: Option<&Identity>, id: UserId) -> DomainResult<UserListing> {
        guard(identity, Operation::GetUser, None)?;

        let user = self
            .repo
            .get_user(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("user {id}")))?;
        let owned = self.owned_stores(&[id]).await?;
        Ok(listing(&user, &owned))
    }

    /// First store of each owner with its rating stats.
    async fn owned_stores(
        &self,
        owners: &[UserId],
    ) -> DomainResult<HashMap<UserId, (Store, RatingStats)>> {
        let stores = self.repo.stores_by_owners(owners).await?;
        let ids: Vec<StoreId> = stores.iter().map(|s| s.id).collect();
        let ratings = self.repo.ratings_for_stores(&ids).await?;
        let stats = stats_by_store(&ratings);

        let mut by_owner = HashMap::new();
        for store in stores {
            let s = stats.get(&store.id).copied().unwrap_or_default();
            by_owner.entry(store.owner_id).or_insert((store, s));
        }
        Ok(by_owner)
    }
}

fn listing(user: &User, owned: &HashMap<UserId, (Store, RatingStats)>) -> UserListing {
    UserListing::new(user, owned.get(&user.id).map(|(store, stats)| (store, *stats)))
}

/// Hash the credential and persist. `input` must already be validated.
pub(crate) async fn insert_new_user(
    repo: &dyn Repository,
    hasher: &dyn CredentialHasher,
    input: NewUser,
) -> DomainResult<User> {
    let credential_hash = hasher
        .hash(&input.credential)
        .map_err(|e| DomainError::storage(e.to_string()))?;

    let user = repo
        .insert_user(User {
            id: UserId::new(),
            name: input.name,
            email: input.email,
            address: input.address,
            role: input.role,
            credential_hash,
            created_at: Utc::now(),
        })
        .await?;
    tracing::info!(user_id = %user.id, role = %user.role, "user created");
    Ok(user)
}
