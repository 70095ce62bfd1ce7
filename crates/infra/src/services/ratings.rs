//! Rating engine.
//!
//! Enforces the value range, the self-rating prohibition and the
//! one-rating-per-(user, store) key. The key itself is held by the repository
//! through a single conditional write, never a read-then-write here.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use storerate_auth::{Identity, Operation};
use storerate_catalog::{Rating, RatingValue, Store};
use storerate_core::{DomainError, DomainResult, StoreId};

use super::guard;
use crate::repository::Repository;

#[derive(Clone)]
pub struct RatingEngine {
    repo: Arc<dyn Repository>,
}

impl RatingEngine {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    async fn existing_store(&self, store_id: StoreId) -> DomainResult<Store> {
        self.repo
            .get_store(store_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("store {store_id}")))
    }

    /// Create the caller's rating of `store_id`, or overwrite it if one exists.
    #[instrument(skip(self, identity), err)]
    pub async fn submit_rating(
        &self,
        identity: Option<&Identity>,
        store_id: StoreId,
        value: i64,
    ) -> DomainResult<Rating> {
        let caller = guard(identity, Operation::SubmitRating, None)?;
        let value = RatingValue::new(value)?;

        let store = self.existing_store(store_id).await?;
        if store.owner_id == caller.user_id {
            tracing::debug!(user_id = %caller.user_id, "self-rating rejected");
            return Err(DomainError::forbidden("owners cannot rate their own store"));
        }

        let rating = self
            .repo
            .upsert_rating(caller.user_id, store_id, value, Utc::now())
            .await?;
        tracing::info!(rating_id = %rating.id, user_id = %caller.user_id, value = value.get(), "rating submitted");
        Ok(rating)
    }

    /// Change the caller's existing rating. Unlike [`Self::submit_rating`]
    /// this never creates one.
    #[instrument(skip(self, identity), err)]
    pub async fn update_rating(
        &self,
        identity: Option<&Identity>,
        store_id: StoreId,
        value: i64,
    ) -> DomainResult<Rating> {
        let caller = guard(identity, Operation::UpdateRating, None)?;
        let value = RatingValue::new(value)?;

        self.existing_store(store_id).await?;
        let rating = self
            .repo
            .update_rating(caller.user_id, store_id, value, Utc::now())
            .await?
            .ok_or_else(|| DomainError::not_found(format!("rating of store {store_id}")))?;
        tracing::info!(rating_id = %rating.id, user_id = %caller.user_id, value = value.get(), "rating updated");
        Ok(rating)
    }

    /// The caller's rating of `store_id`; `None` when they have not rated it.
    pub async fn get_user_rating(
        &self,
        identity: Option<&Identity>,
        store_id: StoreId,
    ) -> DomainResult<Option<Rating>> {
        let caller = guard(identity, Operation::GetUserRating, None)?;
        Ok(self.repo.get_rating(caller.user_id, store_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Repository;
    use crate::services::test_support::Fixture;
    use storerate_auth::Role;

    #[tokio::test]
    async fn submit_twice_keeps_one_row_with_latest_value() {
        let fx = Fixture::new().await;
        let owner = fx.user("Store Owner One Account Testing", "owner1@stores.com", Role::StoreOwner).await;
        let user = fx.user("Regular User Account for Testing", "user@stores.com", Role::User).await;
        let store = fx.store("Tech Electronics Store", "contact@techstore.com", &owner).await;

        let first = fx.services.ratings.submit_rating(Some(&user), store.id, 4).await.unwrap();
        let again = fx.services.ratings.submit_rating(Some(&user), store.id, 4).await.unwrap();
        assert_eq!(first.id, again.id);

        let changed = fx.services.ratings.submit_rating(Some(&user), store.id, 2).await.unwrap();
        assert_eq!(changed.id, first.id);
        assert_eq!(changed.value.get(), 2);
        assert!(changed.updated_at >= changed.created_at);
        assert_eq!(fx.repo.count_ratings().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn out_of_range_values_are_rejected_before_storage() {
        let fx = Fixture::new().await;
        let user = fx.user("Regular User Account for Testing", "user@stores.com", Role::User).await;

        // Store does not exist, so a storage read would have produced NotFound.
        for v in [0, 6, -3] {
            let err = fx
                .services
                .ratings
                .submit_rating(Some(&user), StoreId::new(), v)
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "value"));
        }
    }

    #[tokio::test]
    async fn rating_an_unknown_store_is_not_found() {
        let fx = Fixture::new().await;
        let user = fx.user("Regular User Account for Testing", "user@stores.com", Role::User).await;

        let err = fx
            .services
            .ratings
            .submit_rating(Some(&user), StoreId::new(), 3)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn self_rating_is_forbidden_for_every_value() {
        let fx = Fixture::new().await;
        // A USER-role account can own a store when an admin assigns it one.
        let owner = fx.user("Regular User Who Owns a Store", "owner@stores.com", Role::User).await;
        let store = fx.store("Tech Electronics Store", "contact@techstore.com", &owner).await;

        for v in 1..=5 {
            let err = fx
                .services
                .ratings
                .submit_rating(Some(&owner), store.id, v)
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Forbidden(_)), "value {v}");
        }
        assert_eq!(fx.repo.count_ratings().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_requires_an_existing_rating() {
        let fx = Fixture::new().await;
        let owner = fx.user("Store Owner One Account Testing", "owner1@stores.com", Role::StoreOwner).await;
        let user = fx.user("Regular User Account for Testing", "user@stores.com", Role::User).await;
        let store = fx.store("Tech Electronics Store", "contact@techstore.com", &owner).await;

        let err = fx
            .services
            .ratings
            .update_rating(Some(&user), store.id, 3)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");

        fx.services.ratings.submit_rating(Some(&user), store.id, 3).await.unwrap();
        let updated = fx.services.ratings.update_rating(Some(&user), store.id, 5).await.unwrap();
        assert_eq!(updated.value.get(), 5);
    }

    #[tokio::test]
    async fn get_user_rating_is_none_not_an_error() {
        let fx = Fixture::new().await;
        let owner = fx.user("Store Owner One Account Testing", "owner1@stores.com", Role::StoreOwner).await;
        let user = fx.user("Regular User Account for Testing", "user@stores.com", Role::User).await;
        let store = fx.store("Tech Electronics Store", "contact@techstore.com", &owner).await;

        assert_eq!(fx.services.ratings.get_user_rating(Some(&user), store.id).await.unwrap(), None);
        fx.services.ratings.submit_rating(Some(&user), store.id, 4).await.unwrap();
        let got = fx.services.ratings.get_user_rating(Some(&user), store.id).await.unwrap();
        assert_eq!(got.map(|r| r.value.get()), Some(4));
    }

    #[tokio::test]
    async fn only_users_may_rate() {
        let fx = Fixture::new().await;
        let owner = fx.user("Store Owner One Account Testing", "owner1@stores.com", Role::StoreOwner).await;
        let other_owner = fx.user("Store Owner Two Account Testing", "owner2@stores.com", Role::StoreOwner).await;
        let store = fx.store("Tech Electronics Store", "contact@techstore.com", &owner).await;

        for caller in [other_owner, fx.admin] {
            let err = fx
                .services
                .ratings
                .submit_rating(Some(&caller), store.id, 5)
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Forbidden(_)));
        }
        assert_eq!(
            fx.services.ratings.submit_rating(None, store.id, 5).await.unwrap_err(),
            DomainError::Unauthenticated
        );
    }
}
