//! Store catalog: creation, edits and the aggregated read paths.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use storerate_auth::{Identity, Operation, Role};
use storerate_catalog::{
    NewStore, Store, StoreDetail, StoreListing, StorePatch, StoreQuery, StoreRatingEntry,
    rating_entries, stats_by_store,
};
use storerate_core::{DomainError, DomainResult, StoreId};

use super::{guard, guard_role, users_by_id};
use crate::repository::Repository;

#[derive(Clone)]
pub struct StoreService {
    repo: Arc<dyn Repository>,
}

impl StoreService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    async fn existing_store(&self, id: StoreId) -> DomainResult<Store> {
        self.repo
            .get_store(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("store {id}")))
    }

    /// Admins may create a store for any existing user; store owners only
    /// for themselves.
    #[instrument(skip(self, identity, input), fields(owner_id = %input.owner_id), err)]
    pub async fn create_store(&self, identity: Option<&Identity>, input: NewStore) -> DomainResult<Store> {
        guard(identity, Operation::CreateStore, Some(input.owner_id))?;
        let input = input.validated()?;

        if self.repo.get_user(input.owner_id).await?.is_none() {
            return Err(DomainError::not_found(format!("owner {}", input.owner_id)));
        }

        let store = self
            .repo
            .insert_store(Store {
                id: StoreId::new(),
                name: input.name,
                email: input.email,
                address: input.address,
                owner_id: input.owner_id,
                created_at: Utc::now(),
            })
            .await?;
        tracing::info!(store_id = %store.id, "store created");
        Ok(store)
    }

    /// Filtered, sorted listing with aggregates. USER callers also get their
    /// own rating of each store.
    pub async fn list_stores(
        &self,
        identity: Option<&Identity>,
        query: &StoreQuery,
    ) -> DomainResult<Vec<StoreListing>> {
        let caller = guard(identity, Operation::ListStores, None)?;

        let stores = self.repo.list_stores(query).await?;
        let ids: Vec<StoreId> = stores.iter().map(|s| s.id).collect();
        let ratings = self.repo.ratings_for_stores(&ids).await?;
        let stats = stats_by_store(&ratings);
        let owners = users_by_id(self.repo.as_ref(), stores.iter().map(|s| s.owner_id)).await?;

        Ok(stores
            .iter()
            .map(|store| {
                let user_rating = (caller.role == Role::User).then(|| {
                    ratings
                        .iter()
                        .find(|r| r.store_id == store.id && r.user_id == caller.user_id)
                        .map(|r| r.value.get())
                });
                StoreListing::new(
                    store,
                    owners.get(&store.owner_id),
                    stats.get(&store.id).copied().unwrap_or_default(),
                    user_rating,
                )
            })
            .collect())
    }

    /// One store with aggregates and every rating.
    pub async fn get_store(&self, identity: Option<&Identity>, id: StoreId) -> DomainResult<StoreDetail> {
        guard(identity, Operation::GetStore, None)?;

        let store = self.existing_store(id).await?;
        let ratings = self.repo.ratings_for_stores(&[id]).await?;
        let users = users_by_id(
            self.repo.as_ref(),
            ratings.iter().map(|r| r.user_id).chain([store.owner_id]),
        )
        .await?;

        Ok(StoreDetail::new(&store, users.get(&store.owner_id), &ratings, &users))
    }

    /// Partial edit by an admin or the owning store owner.
    #[instrument(skip(self, identity, patch), err)]
    pub async fn update_store(
        &self,
        identity: Option<&Identity>,
        id: StoreId,
        patch: StorePatch,
    ) -> DomainResult<Store> {
        guard_role(identity, Operation::UpdateStore)?;
        let patch = patch.validated()?;

        let current = self.existing_store(id).await?;
        guard(identity, Operation::UpdateStore, Some(current.owner_id))?;

        if patch.is_empty() {
            return Ok(current);
        }
        let updated = self
            .repo
            .update_store(id, &patch)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("store {id}")))?;
        tracing::info!(store_id = %id, "store updated");
        Ok(updated)
    }

    /// Ratings of one store with rater details, newest first.
    pub async fn get_store_ratings(
        &self,
        identity: Option<&Identity>,
        id: StoreId,
    ) -> DomainResult<Vec<StoreRatingEntry>> {
        guard(identity, Operation::GetStoreRatings, None)?;

        self.existing_store(id).await?;
        let ratings = self.repo.ratings_for_stores(&[id]).await?;
        let users = users_by_id(self.repo.as_ref(), ratings.iter().map(|r| r.user_id)).await?;
        Ok(rating_entries(&ratings, &users))
    }

    /// The caller's own stores with aggregates and ratings.
    pub async fn list_owned_stores(&self, identity: Option<&Identity>) -> DomainResult<Vec<StoreDetail>> {
        let caller = guard(identity, Operation::ListOwnedStores, None)?;

        let stores = self.repo.stores_by_owners(&[caller.user_id]).await?;
        let ids: Vec<StoreId> = stores.iter().map(|s| s.id).collect();
        let ratings = self.repo.ratings_for_stores(&ids).await?;
        let users = users_by_id(
            self.repo.as_ref(),
            ratings.iter().map(|r| r.user_id).chain([caller.user_id]),
        )
        .await?;

        Ok(stores
            .iter()
            .map(|store| {
                let own: Vec<_> = ratings.iter().filter(|r| r.store_id == store.id).cloned().collect();
                StoreDetail::new(store, users.get(&store.owner_id), &own, &users)
            })
            .collect())
    }
}
