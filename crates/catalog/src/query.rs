//! Filtering and sorting of user and store listings.
//!
//! Text filters are case-insensitive substring matches. Sort fields are
//! closed enums: an unknown `sortBy` is rejected, never silently ignored.
//! Every ordering falls back to creation time then id so results are stable.

use core::cmp::Ordering;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use storerate_auth::Role;
use storerate_core::{DomainError, DomainResult};

use crate::model::{Store, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(DomainError::validation("sortOrder", "must be 'asc' or 'desc'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSortField {
    Name,
    Email,
    Address,
    CreatedAt,
}

impl StoreSortField {
    pub fn column(self) -> &'static str {
        match self {
            StoreSortField::Name => "name",
            StoreSortField::Email => "email",
            StoreSortField::Address => "address",
            StoreSortField::CreatedAt => "created_at",
        }
    }
}

impl FromStr for StoreSortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(StoreSortField::Name),
            "email" => Ok(StoreSortField::Email),
            "address" => Ok(StoreSortField::Address),
            "createdAt" | "created_at" => Ok(StoreSortField::CreatedAt),
            other => Err(DomainError::validation(
                "sortBy",
                format!("unknown store field '{other}' (expected name, email, address or createdAt)"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortField {
    Name,
    Email,
    Address,
    Role,
    CreatedAt,
}

impl UserSortField {
    pub fn column(self) -> &'static str {
        match self {
            UserSortField::Name => "name",
            UserSortField::Email => "email",
            UserSortField::Address => "address",
            UserSortField::Role => "role",
            UserSortField::CreatedAt => "created_at",
        }
    }
}

impl FromStr for UserSortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(UserSortField::Name),
            "email" => Ok(UserSortField::Email),
            "address" => Ok(UserSortField::Address),
            "role" => Ok(UserSortField::Role),
            "createdAt" | "created_at" => Ok(UserSortField::CreatedAt),
            other => Err(DomainError::validation(
                "sortBy",
                format!(
                    "unknown user field '{other}' (expected name, email, address, role or createdAt)"
                ),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<F> {
    pub field: F,
    pub order: SortOrder,
}

fn parse_sort<F>(sort_by: Option<&str>, sort_order: Option<&str>) -> DomainResult<Option<Sort<F>>>
where
    F: FromStr<Err = DomainError>,
{
    let order = sort_order.map(str::parse).transpose()?.unwrap_or_default();
    let Some(sort_by) = sort_by else {
        return Ok(None);
    };
    Ok(Some(Sort {
        field: sort_by.parse()?,
        order,
    }))
}

/// Case-insensitive substring match. An absent needle matches everything.
pub fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stores
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StoreFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl StoreFilter {
    pub fn matches(&self, store: &Store) -> bool {
        contains_ci(&store.name, self.name.as_deref())
            && contains_ci(&store.email, self.email.as_deref())
            && contains_ci(&store.address, self.address.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreQuery {
    pub filter: StoreFilter,
    pub sort: Option<Sort<StoreSortField>>,
}

impl StoreQuery {
    pub fn parse(
        filter: StoreFilter,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> DomainResult<Self> {
        Ok(Self {
            filter,
            sort: parse_sort(sort_by, sort_order)?,
        })
    }

    /// Filter and order an in-memory snapshot the same way the SQL backend does.
    pub fn apply(&self, stores: impl IntoIterator<Item = Store>) -> Vec<Store> {
        let mut out: Vec<Store> = stores.into_iter().filter(|s| self.filter.matches(s)).collect();
        out.sort_by(|a, b| {
            let primary = match self.sort {
                None => Ordering::Equal,
                Some(Sort { field, order }) => order.apply(match field {
                    StoreSortField::Name => a.name.cmp(&b.name),
                    StoreSortField::Email => a.email.cmp(&b.email),
                    StoreSortField::Address => a.address.cmp(&b.address),
                    StoreSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                }),
            };
            primary
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        out
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Exact match, unlike the text fields.
    pub role: Option<Role>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        contains_ci(&user.name, self.name.as_deref())
            && contains_ci(&user.email, self.email.as_deref())
            && contains_ci(&user.address, self.address.as_deref())
            && self.role.is_none_or(|r| r == user.role)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub filter: UserFilter,
    pub sort: Option<Sort<UserSortField>>,
}

impl UserQuery {
    pub fn parse(
        filter: UserFilter,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> DomainResult<Self> {
        Ok(Self {
            filter,
            sort: parse_sort(sort_by, sort_order)?,
        })
    }

    pub fn apply(&self, users: impl IntoIterator<Item = User>) -> Vec<User> {
        let mut out: Vec<User> = users.into_iter().filter(|u| self.filter.matches(u)).collect();
        out.sort_by(|a, b| {
            let primary = match self.sort {
                None => Ordering::Equal,
                Some(Sort { field, order }) => order.apply(match field {
                    UserSortField::Name => a.name.cmp(&b.name),
                    UserSortField::Email => a.email.cmp(&b.email),
                    UserSortField::Address => a.address.cmp(&b.address),
                    UserSortField::Role => a.role.as_str().cmp(b.role.as_str()),
                    UserSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                }),
            };
            primary
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        out
    }
}
