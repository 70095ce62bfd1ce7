//! Demo data for local runs.
//!
//! Seeding is idempotent: accounts and stores are looked up by email first and
//! left untouched when present. Ratings go through the upsert, so re-running
//! resets them to the demo values.

use chrono::Utc;
use serde::Serialize;

use storerate_auth::{CredentialHasher, Role};
use storerate_catalog::{NewStore, NewUser, RatingValue, Store, User};
use storerate_core::{DomainError, DomainResult, StoreId, UserId};

use crate::repository::Repository;

struct DemoUser {
    name: &'static str,
    email: &'static str,
    address: &'static str,
    credential: &'static str,
    role: Role,
}

const ADMIN: DemoUser = DemoUser {
    name: "System Administrator Account",
    email: "admin@stores.com",
    address: "123 Admin Street, Admin City, Admin State 12345",
    credential: "Admin123!",
    role: Role::Admin,
};

const USER: DemoUser = DemoUser {
    name: "Regular User Account for Testing",
    email: "user@stores.com",
    address: "456 User Avenue, User City, User State 67890",
    credential: "User123!",
    role: Role::User,
};

const OWNER_ONE: DemoUser = DemoUser {
    name: "Store Owner One Account Testing",
    email: "owner1@stores.com",
    address: "789 Owner Street, Business District, City 11111",
    credential: "User123!",
    role: Role::StoreOwner,
};

const OWNER_TWO: DemoUser = DemoUser {
    name: "Store Owner Two Account Testing",
    email: "owner2@stores.com",
    address: "321 Commerce Ave, Shopping Center, City 22222",
    credential: "User123!",
    role: Role::StoreOwner,
};

/// What a seed run actually inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub users_created: u32,
    pub stores_created: u32,
    pub ratings_written: u32,
}

pub async fn seed_demo(
    repo: &dyn Repository,
    hasher: &dyn CredentialHasher,
) -> DomainResult<SeedReport> {
    let mut report = SeedReport::default();

    let admin = ensure_user(repo, hasher, &ADMIN, &mut report).await?;
    let user = ensure_user(repo, hasher, &USER, &mut report).await?;
    let owner_one = ensure_user(repo, hasher, &OWNER_ONE, &mut report).await?;
    let owner_two = ensure_user(repo, hasher, &OWNER_TWO, &mut report).await?;

    let tech = ensure_store(
        repo,
        NewStore {
            name: "Tech Electronics Store".into(),
            email: "contact@techstore.com".into(),
            address: "100 Tech Plaza, Electronics District, Tech City 33333".into(),
            owner_id: owner_one.id,
        },
        &mut report,
    )
    .await?;
    let fashion = ensure_store(
        repo,
        NewStore {
            name: "Fashion Boutique & Accessories".into(),
            email: "info@fashionboutique.com".into(),
            address: "200 Fashion Street, Style District, Fashion City 44444".into(),
            owner_id: owner_two.id,
        },
        &mut report,
    )
    .await?;

    rate(repo, user.id, tech.id, 5, &mut report).await?;
    rate(repo, admin.id, fashion.id, 4, &mut report).await?;

    tracing::info!(
        users_created = report.users_created,
        stores_created = report.stores_created,
        ratings_written = report.ratings_written,
        "demo data seeded"
    );
    Ok(report)
}

async fn ensure_user(
    repo: &dyn Repository,
    hasher: &dyn CredentialHasher,
    demo: &DemoUser,
    report: &mut SeedReport,
) -> DomainResult<User> {
    if let Some(existing) = repo.find_user_by_email(demo.email).await? {
        return Ok(existing);
    }

    let input = NewUser {
        name: demo.name.into(),
        email: demo.email.into(),
        address: demo.address.into(),
        credential: demo.credential.into(),
        role: demo.role,
    }
    .validated()?;
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
    report.users_created += 1;
    Ok(user)
}

async fn ensure_store(
    repo: &dyn Repository,
    input: NewStore,
    report: &mut SeedReport,
) -> DomainResult<Store> {
    let input = input.validated()?;
    let owned = repo.stores_by_owners(&[input.owner_id]).await?;
    if let Some(existing) = owned.into_iter().find(|s| s.email == input.email) {
        return Ok(existing);
    }

    let store = repo
        .insert_store(Store {
            id: StoreId::new(),
            name: input.name,
            email: input.email,
            address: input.address,
            owner_id: input.owner_id,
            created_at: Utc::now(),
        })
        .await?;
    report.stores_created += 1;
    Ok(store)
}

async fn rate(
    repo: &dyn Repository,
    user: UserId,
    store: StoreId,
    value: i64,
    report: &mut SeedReport,
) -> DomainResult<()> {
    repo.upsert_rating(user, store, RatingValue::new(value)?, Utc::now())
        .await?;
    report.ratings_written += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use crate::services::test_support::PlainHasher;

    #[tokio::test]
    async fn seeds_the_demo_catalog() {
        let repo = InMemoryRepository::new();
        let report = seed_demo(&repo, &PlainHasher).await.unwrap();

        assert_eq!(
            report,
            SeedReport {
                users_created: 4,
                stores_created: 2,
                ratings_written: 2,
            }
        );
        assert_eq!(repo.count_users().await.unwrap(), 4);
        assert_eq!(repo.count_stores().await.unwrap(), 2);
        assert_eq!(repo.count_ratings().await.unwrap(), 2);

        let owner = repo.find_user_by_email("owner1@stores.com").await.unwrap().unwrap();
        assert_eq!(owner.role, Role::StoreOwner);
        assert_eq!(owner.credential_hash, "plain:User123!");
    }

    #[tokio::test]
    async fn reseeding_creates_nothing_new() {
        let repo = InMemoryRepository::new();
        seed_demo(&repo, &PlainHasher).await.unwrap();
        let again = seed_demo(&repo, &PlainHasher).await.unwrap();

        assert_eq!(again.users_created, 0);
        assert_eq!(again.stores_created, 0);
        assert_eq!(repo.count_users().await.unwrap(), 4);
        assert_eq!(repo.count_stores().await.unwrap(), 2);
        assert_eq!(repo.count_ratings().await.unwrap(), 2);
    }
}
