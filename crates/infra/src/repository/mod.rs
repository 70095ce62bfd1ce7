//! Persistence boundary for users, stores and ratings.
//!
//! Services depend only on [`Repository`]; the backing engine is chosen at
//! startup. Implementations enforce email uniqueness and the
//! one-rating-per-(user, store) key themselves, so the guarantees hold even
//! when two requests race.

pub mod in_memory;
pub mod postgres;

use chrono::{DateTime, Utc};
use thiserror::Error;

use storerate_catalog::{Rating, RatingValue, Store, StorePatch, StoreQuery, User, UserQuery};
use storerate_core::{DomainError, StoreId, UserId};

pub use in_memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// Errors raised by a repository implementation.
///
/// ## Error Categories
///
/// - **Conflict**: a unique key (user email, store email) is already taken
/// - **MissingReference**: a referenced user or store row does not exist
/// - **Unavailable**: the backend could not run the operation at all
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{0} not found")]
    MissingReference(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for DomainError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => DomainError::conflict(msg),
            RepositoryError::MissingReference(what) => DomainError::not_found(what),
            RepositoryError::Unavailable(msg) => DomainError::storage(msg),
        }
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    // ── users ────────────────────────────────────────────────────────────────

    /// Insert a new user. Duplicate email → `Conflict`.
    async fn insert_user(&self, user: User) -> RepoResult<User>;

    async fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;

    /// Lookup by normalized (lowercase) email.
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Users with the given ids; unknown ids are skipped.
    async fn users_by_ids(&self, ids: &[UserId]) -> RepoResult<Vec<User>>;

    async fn list_users(&self, query: &UserQuery) -> RepoResult<Vec<User>>;

    /// Replace the credential hash. Returns `false` if the user does not exist.
    async fn update_credential(&self, id: UserId, credential_hash: String) -> RepoResult<bool>;

    async fn count_users(&self) -> RepoResult<u64>;

    // ── stores ───────────────────────────────────────────────────────────────

    /// Insert a new store. Duplicate email → `Conflict`; unknown owner →
    /// `MissingReference`.
    async fn insert_store(&self, store: Store) -> RepoResult<Store>;

    async fn get_store(&self, id: StoreId) -> RepoResult<Option<Store>>;

    async fn list_stores(&self, query: &StoreQuery) -> RepoResult<Vec<Store>>;

    /// Stores owned by any of `owners`, oldest first.
    async fn stores_by_owners(&self, owners: &[UserId]) -> RepoResult<Vec<Store>>;

    /// Apply `patch` in one write. `None` if the store does not exist.
    async fn update_store(&self, id: StoreId, patch: &StorePatch) -> RepoResult<Option<Store>>;

    async fn count_stores(&self) -> RepoResult<u64>;

    // ── ratings ──────────────────────────────────────────────────────────────

    /// Insert-or-update keyed on `(user_id, store_id)` as a single atomic write.
    ///
    /// A new row gets `created_at == updated_at == now`; an existing row keeps
    /// its id and `created_at` and takes the new value and `updated_at`.
    async fn upsert_rating(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
        now: DateTime<Utc>,
    ) -> RepoResult<Rating>;

    /// Update an existing rating in one write. `None` if the pair has no rating.
    async fn update_rating(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Rating>>;

    async fn get_rating(&self, user_id: UserId, store_id: StoreId) -> RepoResult<Option<Rating>>;

    /// All ratings of the given stores.
    async fn ratings_for_stores(&self, store_ids: &[StoreId]) -> RepoResult<Vec<Rating>>;

    async fn count_ratings(&self) -> RepoResult<u64>;
}
