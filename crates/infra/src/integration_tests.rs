//! Integration tests across the service layer.
//!
//! Tests: Identity → Services → Repository → Aggregation
//!
//! Verifies:
//! - Aggregates reflect every write immediately
//! - Role and ownership gates hold for every actor
//! - Concurrent rating submissions collapse to one row

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use storerate_auth::{Identity, Role};
    use storerate_catalog::{DashboardStats, StoreFilter, StoreQuery, UserQuery};
    use storerate_core::DomainError;

    use crate::repository::Repository;
    use crate::seed::seed_demo;
    use crate::services::test_support::{Fixture, PlainHasher};

    struct Cast {
        owner: Identity,
        alice: Identity,
        bob: Identity,
    }

    async fn cast(fx: &Fixture) -> Cast {
        Cast {
            owner: fx.user("Store Owner One Account Testing", "owner1@stores.com", Role::StoreOwner).await,
            alice: fx.user("Alice Regular User Account", "alice@stores.com", Role::User).await,
            bob: fx.user("Bob Regular User Account Test", "bob@stores.com", Role::User).await,
        }
    }

    #[tokio::test]
    async fn two_ratings_average_four_point_five() {
        let fx = Fixture::new().await;
        let c = cast(&fx).await;
        let store = fx.store("Tech Electronics Store", "contact@techstore.com", &c.owner).await;

        fx.services.ratings.submit_rating(Some(&c.alice), store.id, 5).await.unwrap();
        fx.services.ratings.submit_rating(Some(&c.bob), store.id, 4).await.unwrap();

        let detail = fx.services.stores.get_store(Some(&c.owner), store.id).await.unwrap();
        assert_eq!(detail.average_rating, 4.5);
        assert_eq!(detail.total_ratings, 2);
        assert_eq!(detail.ratings.len(), 2);

        // Listing sees the same aggregate, personalised for the USER caller.
        let listing = fx
            .services
            .stores
            .list_stores(Some(&c.alice), &StoreQuery::default())
            .await
            .unwrap();
        assert_eq!(listing[0].average_rating, 4.5);
        assert_eq!(listing[0].user_rating, Some(Some(5)));
    }

    #[tokio::test]
    async fn owner_cannot_rate_own_store() {
        let fx = Fixture::new().await;
        let c = cast(&fx).await;
        let store = fx.store("Tech Electronics Store", "contact@techstore.com", &c.owner).await;

        let err = fx
            .services
            .ratings
            .submit_rating(Some(&c.owner), store.id, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(fx.repo.count_ratings().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn dashboard_counts_three_users_two_stores_two_ratings() {
        let fx = Fixture::new().await;
        let owner = fx.user("Store Owner One Account Testing", "owner1@stores.com", Role::StoreOwner).await;
        let user = fx.user("Regular User Account for Testing", "user@stores.com", Role::User).await;
        let tech = fx.store("Tech Electronics Store", "contact@techstore.com", &owner).await;
        let fashion = fx.store("Fashion Boutique & Accessories", "info@fashionboutique.com", &owner).await;
        fx.services.ratings.submit_rating(Some(&user), tech.id, 5).await.unwrap();
        fx.services.ratings.submit_rating(Some(&user), fashion.id, 3).await.unwrap();

        let stats = fx.services.dashboard.stats(Some(&fx.admin)).await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_users: 3,
                total_stores: 2,
                total_ratings: 2,
            }
        );
    }

    #[tokio::test]
    async fn name_filter_is_case_insensitive_substring() {
        let fx = Fixture::new().await;
        let c = cast(&fx).await;
        fx.store("Tech Electronics Store", "contact@techstore.com", &c.owner).await;
        fx.store("Fashion Boutique & Accessories", "info@fashionboutique.com", &c.owner).await;

        let query = StoreQuery::parse(
            StoreFilter {
                name: Some("tech".into()),
                ..Default::default()
            },
            None,
            None,
        )
        .unwrap();
        let hits = fx.services.stores.list_stores(Some(&c.bob), &query).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Tech Electronics Store");
    }

    #[tokio::test]
    async fn user_never_receives_admin_data() {
        let fx = Fixture::new().await;
        let c = cast(&fx).await;

        let denied = [
            fx.services.users.list_users(Some(&c.alice), &UserQuery::default()).await.err(),
            fx.services.users.get_user(Some(&c.alice), c.bob.user_id).await.err(),
            fx.services.dashboard.stats(Some(&c.alice)).await.err(),
        ];
        for err in denied {
            assert!(matches!(err, Some(DomainError::Forbidden(_))));
        }

        assert_eq!(
            fx.services.dashboard.stats(None).await.unwrap_err(),
            DomainError::Unauthenticated
        );
    }

    #[tokio::test]
    async fn update_after_submit_and_not_before() {
        let fx = Fixture::new().await;
        let c = cast(&fx).await;
        let store = fx.store("Tech Electronics Store", "contact@techstore.com", &c.owner).await;

        let err = fx
            .services
            .ratings
            .update_rating(Some(&c.alice), store.id, 2)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");

        fx.services.ratings.submit_rating(Some(&c.alice), store.id, 2).await.unwrap();
        fx.services.ratings.update_rating(Some(&c.alice), store.id, 3).await.unwrap();

        let board = fx.services.dashboard.owner_dashboard(Some(&c.owner)).await.unwrap();
        assert_eq!(board[0].raters.len(), 1);
        assert_eq!(board[0].raters[0].rating, 3);
    }

    #[tokio::test]
    async fn concurrent_submissions_leave_one_row() {
        let fx = Fixture::new().await;
        let c = cast(&fx).await;
        let store = fx.store("Tech Electronics Store", "contact@techstore.com", &c.owner).await;
        let ratings = Arc::new(fx.services.ratings.clone());

        let mut handles = Vec::new();
        for i in 0..16 {
            let ratings = ratings.clone();
            let alice = c.alice;
            let store_id = store.id;
            handles.push(tokio::spawn(async move {
                ratings.submit_rating(Some(&alice), store_id, 1 + (i % 5)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(fx.repo.count_ratings().await.unwrap(), 1);
        let detail = fx.services.stores.get_store(Some(&c.alice), store.id).await.unwrap();
        assert_eq!(detail.total_ratings, 1);
    }

    #[tokio::test]
    async fn seeded_accounts_can_log_in() {
        let fx = Fixture::new().await;
        seed_demo(fx.repo.as_ref(), &PlainHasher).await.unwrap();

        // The fixture admin already holds admin@stores.com, so the seed reused it.
        let session = fx.services.accounts.login("admin@stores.com", "Admin123!").await.unwrap();
        assert_eq!(session.user.id, fx.admin.user_id);

        let owner = fx.services.accounts.login("owner1@stores.com", "User123!").await.unwrap();
        let owner = Identity::new(owner.user.id, owner.user.role);
        let board = fx.services.dashboard.owner_dashboard(Some(&owner)).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].name, "Tech Electronics Store");
        assert_eq!(board[0].average_rating, 5.0);
    }
}
