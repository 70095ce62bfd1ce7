use serde::Deserialize;

use storerate_auth::Role;
use storerate_catalog::{NewStore, NewUser, RatingValue, StoreFilter, StorePatch, StoreQuery, UserFilter, UserQuery};
use storerate_core::{DomainError, DomainResult, StoreId, UserId};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            name: self.name,
            email: self.email,
            address: self.address,
            credential: self.password,
            role: Role::User,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    pub password: String,
    pub role: Role,
}

impl CreateUserRequest {
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            name: self.name,
            email: self.email,
            address: self.address,
            credential: self.password,
            role: self.role,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: String,
}

impl CreateStoreRequest {
    pub fn into_new_store(self) -> DomainResult<NewStore> {
        Ok(NewStore {
            owner_id: parse_user_id(&self.owner_id, "ownerId")?,
            name: self.name,
            email: self.email,
            address: self.address,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl From<UpdateStoreRequest> for StorePatch {
    fn from(body: UpdateStoreRequest) -> Self {
        StorePatch {
            name: body.name,
            email: body.email,
            address: body.address,
        }
    }
}

/// `value` is checked by [`RatingRequest::value`], so `4.5` or `"4"` fail
/// validation on `value` instead of being rejected with the body.
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    #[serde(default)]
    pub value: serde_json::Value,
}

impl RatingRequest {
    pub fn value(&self) -> DomainResult<i64> {
        self.value.as_i64().ok_or_else(|| {
            DomainError::validation(
                "value",
                format!(
                    "must be an integer between {} and {}",
                    RatingValue::MIN,
                    RatingValue::MAX
                ),
            )
        })
    }
}

// -------------------------
// Query parameters
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStoresParams {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListStoresParams {
    pub fn into_query(self) -> DomainResult<StoreQuery> {
        StoreQuery::parse(
            StoreFilter {
                name: self.name,
                email: self.email,
                address: self.address,
            },
            self.sort_by.as_deref(),
            self.sort_order.as_deref(),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersParams {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListUsersParams {
    pub fn into_query(self) -> DomainResult<UserQuery> {
        let role = self.role.as_deref().map(str::parse::<Role>).transpose()?;
        UserQuery::parse(
            UserFilter {
                name: self.name,
                email: self.email,
                address: self.address,
                role,
            },
            self.sort_by.as_deref(),
            self.sort_order.as_deref(),
        )
    }
}

// -------------------------
// Path parsing
// -------------------------

pub fn parse_store_id(raw: &str) -> DomainResult<StoreId> {
    raw.parse::<StoreId>()
        .map_err(|_| DomainError::validation("id", "must be a UUID"))
}

pub fn parse_user_id(raw: &str, field: &str) -> DomainResult<UserId> {
    raw.parse::<UserId>()
        .map_err(|_| DomainError::validation(field, "must be a UUID"))
}
