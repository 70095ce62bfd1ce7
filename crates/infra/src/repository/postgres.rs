//! Postgres-backed repository.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `RepositoryError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError | Scenario |
//! |------------|----------------------|-----------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Duplicate user or store email |
//! | Database (foreign key violation) | `23503` | `MissingReference` | Unknown owner, user or store id |
//! | Database (other) | Any other | `Unavailable` | Check constraint, serialization failure, etc. |
//! | PoolClosed / Io / Protocol | N/A | `Unavailable` | Connectivity |
//!
//! ## Atomicity
//!
//! The rating upsert is a single `INSERT .. ON CONFLICT (user_id, store_id)
//! DO UPDATE .. RETURNING`, so two concurrent submissions for the same pair
//! serialize on the unique index instead of racing a read-then-write.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;
use uuid::Uuid;

use storerate_auth::Role;
use storerate_catalog::{
    Rating, RatingValue, Store, StoreFilter, StorePatch, StoreQuery, User, UserFilter, UserQuery,
};
use storerate_core::{RatingId, StoreId, UserId};

use super::{RepoResult, Repository, RepositoryError};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const USER_COLUMNS: &str = "id, name, email, address, role, credential_hash, created_at";
const STORE_COLUMNS: &str = "id, name, email, address, owner_id, created_at";
const RATING_COLUMNS: &str = "id, user_id, store_id, value, created_at, updated_at";

/// Create a connection pool.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: Arc<PgPool>,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Apply the schema. Every statement is `IF NOT EXISTS`, so this is safe
    /// to run on each startup.
    pub async fn migrate(&self) -> RepoResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn count(&self, operation: &str, sql: &'static str) -> RepoResult<u64> {
        let row = sqlx::query(sql)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| map_sqlx_error(operation, e))?;
        Ok(total as u64)
    }
}

#[async_trait::async_trait]
impl Repository for PostgresRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert_user(&self, user: User) -> RepoResult<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.address)
        .bind(user.role.as_str())
        .bind(&user.credential_hash)
        .bind(user.created_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        user_from_row(&row)
    }

    async fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> RepoResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("users_by_ids", e))?;
        rows.iter().map(user_from_row).collect()
    }

    async fn list_users(&self, query: &UserQuery) -> RepoResult<Vec<User>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE TRUE"));
        push_user_filter(&mut qb, &query.filter);
        push_order_by(
            &mut qb,
            query.sort.map(|s| (s.field.column(), s.order.as_sql())),
        );

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;
        rows.iter().map(user_from_row).collect()
    }

    #[instrument(skip(self, credential_hash), fields(user_id = %id), err)]
    async fn update_credential(&self, id: UserId, credential_hash: String) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE users SET credential_hash = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(credential_hash)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_credential", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn count_users(&self) -> RepoResult<u64> {
        self.count("count_users", "SELECT COUNT(*) AS total FROM users")
            .await
    }

    #[instrument(skip(self, store), fields(store_id = %store.id), err)]
    async fn insert_store(&self, store: Store) -> RepoResult<Store> {
        let row = sqlx::query(&format!(
            "INSERT INTO stores ({STORE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {STORE_COLUMNS}"
        ))
        .bind(store.id.as_uuid())
        .bind(&store.name)
        .bind(&store.email)
        .bind(&store.address)
        .bind(store.owner_id.as_uuid())
        .bind(store.created_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_store", e))?;
        store_from_row(&row)
    }

    async fn get_store(&self, id: StoreId) -> RepoResult<Option<Store>> {
        let row = sqlx::query(&format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_store", e))?;
        row.as_ref().map(store_from_row).transpose()
    }

    async fn list_stores(&self, query: &StoreQuery) -> RepoResult<Vec<Store>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {STORE_COLUMNS} FROM stores WHERE TRUE"));
        push_store_filter(&mut qb, &query.filter);
        push_order_by(
            &mut qb,
            query.sort.map(|s| (s.field.column(), s.order.as_sql())),
        );

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_stores", e))?;
        rows.iter().map(store_from_row).collect()
    }

    async fn stores_by_owners(&self, owners: &[UserId]) -> RepoResult<Vec<Store>> {
        if owners.is_empty() {
            return Ok(vec![]);
        }
        let owners: Vec<Uuid> = owners.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE owner_id = ANY($1) ORDER BY created_at ASC, id ASC"
        ))
        .bind(owners)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("stores_by_owners", e))?;
        rows.iter().map(store_from_row).collect()
    }

    #[instrument(skip(self, patch), fields(store_id = %id), err)]
    async fn update_store(&self, id: StoreId, patch: &StorePatch) -> RepoResult<Option<Store>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE stores SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                address = COALESCE($4, address)
            WHERE id = $1
            RETURNING {STORE_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(patch.name.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.address.as_deref())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_store", e))?;
        row.as_ref().map(store_from_row).transpose()
    }

    async fn count_stores(&self) -> RepoResult<u64> {
        self.count("count_stores", "SELECT COUNT(*) AS total FROM stores")
            .await
    }

    #[instrument(skip(self), err)]
    async fn upsert_rating(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
        now: DateTime<Utc>,
    ) -> RepoResult<Rating> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO ratings ({RATING_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (user_id, store_id)
            DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = EXCLUDED.updated_at
            RETURNING {RATING_COLUMNS}
            "#
        ))
        .bind(*RatingId::new().as_uuid())
        .bind(user_id.as_uuid())
        .bind(store_id.as_uuid())
        .bind(i16::from(value.get()))
        .bind(now)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_rating", e))?;
        rating_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn update_rating(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Rating>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE ratings SET value = $3, updated_at = $4
            WHERE user_id = $1 AND store_id = $2
            RETURNING {RATING_COLUMNS}
            "#
        ))
        .bind(user_id.as_uuid())
        .bind(store_id.as_uuid())
        .bind(i16::from(value.get()))
        .bind(now)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_rating", e))?;
        row.as_ref().map(rating_from_row).transpose()
    }

    async fn get_rating(&self, user_id: UserId, store_id: StoreId) -> RepoResult<Option<Rating>> {
        let row = sqlx::query(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE user_id = $1 AND store_id = $2"
        ))
        .bind(user_id.as_uuid())
        .bind(store_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_rating", e))?;
        row.as_ref().map(rating_from_row).transpose()
    }

    async fn ratings_for_stores(&self, store_ids: &[StoreId]) -> RepoResult<Vec<Rating>> {
        if store_ids.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<Uuid> = store_ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE store_id = ANY($1) ORDER BY created_at ASC, id ASC"
        ))
        .bind(ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ratings_for_stores", e))?;
        rows.iter().map(rating_from_row).collect()
    }

    async fn count_ratings(&self) -> RepoResult<u64> {
        self.count("count_ratings", "SELECT COUNT(*) AS total FROM ratings")
            .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Query building
// ─────────────────────────────────────────────────────────────────────────────

/// `ILIKE` pattern for a literal substring: `%`, `_` and `\` are escaped.
fn contains_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn push_contains(qb: &mut QueryBuilder<'_, Postgres>, column: &str, needle: Option<&str>) {
    if let Some(needle) = needle {
        qb.push(format!(" AND {column} ILIKE "))
            .push_bind(contains_pattern(needle));
    }
}

fn push_store_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &StoreFilter) {
    push_contains(qb, "name", filter.name.as_deref());
    push_contains(qb, "email", filter.email.as_deref());
    push_contains(qb, "address", filter.address.as_deref());
}

fn push_user_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    push_contains(qb, "name", filter.name.as_deref());
    push_contains(qb, "email", filter.email.as_deref());
    push_contains(qb, "address", filter.address.as_deref());
    if let Some(role) = filter.role {
        qb.push(" AND role = ").push_bind(role.as_str());
    }
}

/// Columns come from the closed sort enums, never from request text. Text
/// columns sort bytewise to match the in-memory backend.
fn push_order_by(qb: &mut QueryBuilder<'_, Postgres>, sort: Option<(&'static str, &'static str)>) {
    qb.push(" ORDER BY ");
    if let Some((column, direction)) = sort {
        qb.push(column);
        if column != "created_at" {
            qb.push(" COLLATE \"C\"");
        }
        qb.push(" ").push(direction).push(", ");
    }
    qb.push("created_at ASC, id ASC");
}

// ─────────────────────────────────────────────────────────────────────────────
// Row mapping
// ─────────────────────────────────────────────────────────────────────────────

fn user_from_row(row: &PgRow) -> RepoResult<User> {
    let read = |e| map_sqlx_error("read_user", e);
    let role: String = row.try_get("role").map_err(read)?;
    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(read)?),
        name: row.try_get("name").map_err(read)?,
        email: row.try_get("email").map_err(read)?,
        address: row.try_get("address").map_err(read)?,
        role: role
            .parse::<Role>()
            .map_err(|_| RepositoryError::Unavailable(format!("unknown role '{role}' in users row")))?,
        credential_hash: row.try_get("credential_hash").map_err(read)?,
        created_at: row.try_get("created_at").map_err(read)?,
    })
}

fn store_from_row(row: &PgRow) -> RepoResult<Store> {
    let read = |e| map_sqlx_error("read_store", e);
    Ok(Store {
        id: StoreId::from_uuid(row.try_get("id").map_err(read)?),
        name: row.try_get("name").map_err(read)?,
        email: row.try_get("email").map_err(read)?,
        address: row.try_get("address").map_err(read)?,
        owner_id: UserId::from_uuid(row.try_get("owner_id").map_err(read)?),
        created_at: row.try_get("created_at").map_err(read)?,
    })
}

fn rating_from_row(row: &PgRow) -> RepoResult<Rating> {
    let read = |e| map_sqlx_error("read_rating", e);
    let value: i16 = row.try_get("value").map_err(read)?;
    Ok(Rating {
        id: RatingId::from_uuid(row.try_get("id").map_err(read)?),
        value: RatingValue::new(i64::from(value))
            .map_err(|_| RepositoryError::Unavailable(format!("rating value {value} out of range")))?,
        user_id: UserId::from_uuid(row.try_get("user_id").map_err(read)?),
        store_id: StoreId::from_uuid(row.try_get("store_id").map_err(read)?),
        created_at: row.try_get("created_at").map_err(read)?,
        updated_at: row.try_get("updated_at").map_err(read)?,
    })
}

/// Map SQLx errors to RepositoryError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => {
                    let what = match db_err.constraint() {
                        Some("users_email_key") => "email is already registered".to_string(),
                        Some("stores_email_key") => "store email is already registered".to_string(),
                        _ => msg,
                    };
                    RepositoryError::Conflict(what)
                }
                Some("23503") => {
                    let what = match db_err.constraint() {
                        Some("stores_owner_fk") => "owner",
                        Some("ratings_user_fk") => "user",
                        Some("ratings_store_fk") => "store",
                        _ => "referenced row",
                    };
                    RepositoryError::MissingReference(what.to_string())
                }
                _ => {
                    tracing::warn!(operation, error = %msg, "database error");
                    RepositoryError::Unavailable(msg)
                }
            }
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Unavailable(format!("connection pool closed in {}", operation))
        }
        other => {
            tracing::warn!(operation, error = %other, "sqlx error");
            RepositoryError::Unavailable(format!("sqlx error in {}: {}", operation, other))
        }
    }
}
