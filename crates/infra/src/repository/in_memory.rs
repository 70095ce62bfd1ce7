use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use storerate_catalog::{Rating, RatingValue, Store, StorePatch, StoreQuery, User, UserQuery};
use storerate_core::{RatingId, StoreId, UserId};

use super::{RepoResult, Repository, RepositoryError};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    user_emails: HashMap<String, UserId>,
    stores: HashMap<StoreId, Store>,
    store_emails: HashMap<String, StoreId>,
    ratings: HashMap<(UserId, StoreId), Rating>,
}

/// In-memory repository.
///
/// Intended for tests/dev. Every table sits behind one lock, so each trait
/// method is a single critical section and the rating upsert cannot race.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| RepositoryError::Unavailable("in-memory tables poisoned".into()))
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| RepositoryError::Unavailable("in-memory tables poisoned".into()))
    }
}

#[async_trait::async_trait]
impl Repository for InMemoryRepository {
    async fn insert_user(&self, user: User) -> RepoResult<User> {
        let mut t = self.write()?;
        if t.user_emails.contains_key(&user.email) {
            return Err(RepositoryError::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }
        t.user_emails.insert(user.email.clone(), user.id);
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let t = self.read()?;
        Ok(t.user_emails.get(email).and_then(|id| t.users.get(id)).cloned())
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> RepoResult<Vec<User>> {
        let t = self.read()?;
        Ok(ids.iter().filter_map(|id| t.users.get(id)).cloned().collect())
    }

    async fn list_users(&self, query: &UserQuery) -> RepoResult<Vec<User>> {
        let t = self.read()?;
        Ok(query.apply(t.users.values().cloned()))
    }

    async fn update_credential(&self, id: UserId, credential_hash: String) -> RepoResult<bool> {
        let mut t = self.write()?;
        match t.users.get_mut(&id) {
            Some(user) => {
                user.credential_hash = credential_hash;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_users(&self) -> RepoResult<u64> {
        Ok(self.read()?.users.len() as u64)
    }

    async fn insert_store(&self, store: Store) -> RepoResult<Store> {
        let mut t = self.write()?;
        if !t.users.contains_key(&store.owner_id) {
            return Err(RepositoryError::MissingReference(format!("owner {}", store.owner_id)));
        }
        if t.store_emails.contains_key(&store.email) {
            return Err(RepositoryError::Conflict(format!(
                "store email '{}' is already registered",
                store.email
            )));
        }
        t.store_emails.insert(store.email.clone(), store.id);
        t.stores.insert(store.id, store.clone());
        Ok(store)
    }

    async fn get_store(&self, id: StoreId) -> RepoResult<Option<Store>> {
        Ok(self.read()?.stores.get(&id).cloned())
    }

    async fn list_stores(&self, query: &StoreQuery) -> RepoResult<Vec<Store>> {
        let t = self.read()?;
        Ok(query.apply(t.stores.values().cloned()))
    }

    async fn stores_by_owners(&self, owners: &[UserId]) -> RepoResult<Vec<Store>> {
        let t = self.read()?;
        let mut stores: Vec<Store> = t
            .stores
            .values()
            .filter(|s| owners.contains(&s.owner_id))
            .cloned()
            .collect();
        stores.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(stores)
    }

    async fn update_store(&self, id: StoreId, patch: &StorePatch) -> RepoResult<Option<Store>> {
        let mut t = self.write()?;
        let Some(mut updated) = t.stores.get(&id).cloned() else {
            return Ok(None);
        };
        let old_email = updated.email.clone();
        patch.apply_to(&mut updated);

        if updated.email != old_email {
            if t.store_emails.contains_key(&updated.email) {
                return Err(RepositoryError::Conflict(format!(
                    "store email '{}' is already registered",
                    updated.email
                )));
            }
            t.store_emails.remove(&old_email);
            t.store_emails.insert(updated.email.clone(), id);
        }
        t.stores.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn count_stores(&self) -> RepoResult<u64> {
        Ok(self.read()?.stores.len() as u64)
    }

    async fn upsert_rating(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
        now: DateTime<Utc>,
    ) -> RepoResult<Rating> {
        let mut t = self.write()?;
        if !t.stores.contains_key(&store_id) {
            return Err(RepositoryError::MissingReference(format!("store {store_id}")));
        }
        if !t.users.contains_key(&user_id) {
            return Err(RepositoryError::MissingReference(format!("user {user_id}")));
        }

        let rating = t
            .ratings
            .entry((user_id, store_id))
            .and_modify(|r| {
                r.value = value;
                r.updated_at = now;
            })
            .or_insert_with(|| Rating {
                id: RatingId::new(),
                value,
                user_id,
                store_id,
                created_at: now,
                updated_at: now,
            });
        Ok(rating.clone())
    }

    async fn update_rating(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Rating>> {
        let mut t = self.write()?;
        Ok(t.ratings.get_mut(&(user_id, store_id)).map(|r| {
            r.value = value;
            r.updated_at = now;
            r.clone()
        }))
    }

    async fn get_rating(&self, user_id: UserId, store_id: StoreId) -> RepoResult<Option<Rating>> {
        Ok(self.read()?.ratings.get(&(user_id, store_id)).cloned())
    }

    async fn ratings_for_stores(&self, store_ids: &[StoreId]) -> RepoResult<Vec<Rating>> {
        let t = self.read()?;
        let mut ratings: Vec<Rating> = t
            .ratings
            .values()
            .filter(|r| store_ids.contains(&r.store_id))
            .cloned()
            .collect();
        ratings.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(ratings)
    }

    async fn count_ratings(&self) -> RepoResult<u64> {
        Ok(self.read()?.ratings.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use storerate_auth::Role;
    use storerate_catalog::StoreFilter;

    fn user(email: &str, role: Role) -> User {
        User {
            id: UserId::new(),
            name: "Regular User Account for Testing".into(),
            email: email.into(),
            address: "456 User Avenue".into(),
            role,
            credential_hash: "hash".into(),
            created_at: Utc::now(),
        }
    }

    fn store(owner: UserId, email: &str) -> Store {
        Store {
            id: StoreId::new(),
            name: "Tech Electronics Store".into(),
            email: email.into(),
            address: "100 Tech Plaza".into(),
            owner_id: owner,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_user_email_conflicts() {
        let repo = InMemoryRepository::new();
        repo.insert_user(user("user@stores.com", Role::User)).await.unwrap();

        let err = repo.insert_user(user("user@stores.com", Role::Admin)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn store_requires_existing_owner() {
        let repo = InMemoryRepository::new();
        let err = repo
            .insert_store(store(UserId::new(), "contact@techstore.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::MissingReference(_)));
    }

    #[tokio::test]
    async fn store_email_change_keeps_index_consistent() {
        let repo = InMemoryRepository::new();
        let owner = repo.insert_user(user("owner1@stores.com", Role::StoreOwner)).await.unwrap();
        let a = repo.insert_store(store(owner.id, "a@shop.com")).await.unwrap();
        repo.insert_store(store(owner.id, "b@shop.com")).await.unwrap();

        let taken = StorePatch {
            email: Some("b@shop.com".into()),
            ..Default::default()
        };
        assert!(matches!(
            repo.update_store(a.id, &taken).await,
            Err(RepositoryError::Conflict(_))
        ));

        let free = StorePatch {
            email: Some("c@shop.com".into()),
            ..Default::default()
        };
        let updated = repo.update_store(a.id, &free).await.unwrap().unwrap();
        assert_eq!(updated.email, "c@shop.com");

        // The old address is released.
        repo.insert_store(store(owner.id, "a@shop.com")).await.unwrap();
        assert_eq!(repo.update_store(StoreId::new(), &free).await.unwrap(), None);
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_and_original_creation_time() {
        let repo = InMemoryRepository::new();
        let owner = repo.insert_user(user("owner1@stores.com", Role::StoreOwner)).await.unwrap();
        let rater = repo.insert_user(user("user@stores.com", Role::User)).await.unwrap();
        let s = repo.insert_store(store(owner.id, "contact@techstore.com")).await.unwrap();

        let t0 = Utc::now();
        let first = repo
            .upsert_rating(rater.id, s.id, RatingValue::new(3).unwrap(), t0)
            .await
            .unwrap();
        assert_eq!(first.created_at, first.updated_at);

        let t1 = t0 + chrono::Duration::seconds(5);
        let second = repo
            .upsert_rating(rater.id, s.id, RatingValue::new(5).unwrap(), t1)
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, t0);
        assert_eq!(second.updated_at, t1);
        assert_eq!(second.value.get(), 5);
        assert_eq!(repo.count_ratings().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_without_existing_rating_is_none() {
        let repo = InMemoryRepository::new();
        let got = repo
            .update_rating(UserId::new(), StoreId::new(), RatingValue::new(2).unwrap(), Utc::now())
            .await
            .unwrap();
        assert_eq!(got, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_upserts_produce_a_single_row() {
        let repo = Arc::new(InMemoryRepository::new());
        let owner = repo.insert_user(user("owner1@stores.com", Role::StoreOwner)).await.unwrap();
        let rater = repo.insert_user(user("user@stores.com", Role::User)).await.unwrap();
        let s = repo.insert_store(store(owner.id, "contact@techstore.com")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..32i64 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                let value = RatingValue::new(i % 5 + 1).unwrap();
                repo.upsert_rating(rater.id, s.id, value, Utc::now()).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        assert_eq!(repo.count_ratings().await.unwrap(), 1);
        assert_eq!(repo.ratings_for_stores(&[s.id]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_stores_applies_query() {
        let repo = InMemoryRepository::new();
        let owner = repo.insert_user(user("owner1@stores.com", Role::StoreOwner)).await.unwrap();
        repo.insert_store(store(owner.id, "contact@techstore.com")).await.unwrap();

        let query = StoreQuery {
            filter: StoreFilter {
                email: Some("TECHSTORE".into()),
                ..Default::default()
            },
            sort: None,
        };
        assert_eq!(repo.list_stores(&query).await.unwrap().len(), 1);

        let query = StoreQuery {
            filter: StoreFilter {
                email: Some("fashion".into()),
                ..Default::default()
            },
            sort: None,
        };
        assert!(repo.list_stores(&query).await.unwrap().is_empty());
    }
}
