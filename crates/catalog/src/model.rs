//! Persistent records and the write-side inputs that create or change them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storerate_auth::Role;
use storerate_core::validation::{validate_address, validate_credential, validate_email, validate_name};
use storerate_core::{DomainError, DomainResult, RatingId, StoreId, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Rating value
// ─────────────────────────────────────────────────────────────────────────────

/// A star rating, always in `1..=5`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RatingValue(u8);

impl RatingValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> DomainResult<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(DomainError::validation(
                "value",
                format!("must be an integer between {} and {}", Self::MIN, Self::MAX),
            ))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// A user account. The credential hash never leaves the service layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: Role,
    pub credential_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// One user's rating of one store. `(user_id, store_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: RatingId,
    pub value: RatingValue,
    pub user_id: UserId,
    pub store_id: StoreId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Write inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Emails are compared case-insensitively, so they are stored lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Input for creating a user (admin-created or self-registered).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub address: String,
    pub credential: String,
    pub role: Role,
}

impl NewUser {
    /// Trim and normalize fields, then check every field rule.
    pub fn validated(self) -> DomainResult<Self> {
        let user = Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            address: self.address.trim().to_string(),
            credential: self.credential,
            role: self.role,
        };
        validate_name("name", &user.name)?;
        validate_email("email", &user.email)?;
        validate_address("address", &user.address)?;
        validate_credential("password", &user.credential)?;
        Ok(user)
    }
}

#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: UserId,
}

impl NewStore {
    pub fn validated(self) -> DomainResult<Self> {
        let store = Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            address: self.address.trim().to_string(),
            owner_id: self.owner_id,
        };
        validate_name("name", &store.name)?;
        validate_email("email", &store.email)?;
        validate_address("address", &store.address)?;
        Ok(store)
    }
}

/// Partial store update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl StorePatch {
    pub fn validated(self) -> DomainResult<Self> {
        let patch = Self {
            name: self.name.map(|n| n.trim().to_string()),
            email: self.email.as_deref().map(normalize_email),
            address: self.address.map(|a| a.trim().to_string()),
        };
        if let Some(name) = &patch.name {
            validate_name("name", name)?;
        }
        if let Some(email) = &patch.email {
            validate_email("email", email)?;
        }
        if let Some(address) = &patch.address {
            validate_address("address", address)?;
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.address.is_none()
    }

    pub fn apply_to(&self, store: &mut Store) {
        if let Some(name) = &self.name {
            store.name = name.clone();
        }
        if let Some(email) = &self.email {
            store.email = email.clone();
        }
        if let Some(address) = &self.address {
            store.address = address.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_value_accepts_only_one_to_five() {
        for v in 1..=5 {
            assert_eq!(RatingValue::new(v).unwrap().get() as i64, v);
        }
        for v in [-1, 0, 6, 255, 256, i64::MAX] {
            let err = RatingValue::new(v).unwrap_err();
            assert_eq!(err.kind(), "validation_failed");
        }
    }

    #[test]
    fn new_user_normalizes_email_and_trims() {
        let user = NewUser {
            name: "  Regular User Account for Testing ".into(),
            email: " User@Stores.COM ".into(),
            address: "456 User Avenue".into(),
            credential: "User123!".into(),
            role: Role::User,
        }
        .validated()
        .unwrap();

        assert_eq!(user.email, "user@stores.com");
        assert_eq!(user.name, "Regular User Account for Testing");
    }

    #[test]
    fn new_store_rejects_short_name() {
        let err = NewStore {
            name: "Tiny Shop".into(),
            email: "tiny@shop.com".into(),
            address: "1 Road".into(),
            owner_id: UserId::new(),
        }
        .validated()
        .unwrap_err();

        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "name"));
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let mut store = Store {
            id: StoreId::new(),
            name: "Tech Electronics Store".into(),
            email: "contact@techstore.com".into(),
            address: "100 Tech Plaza".into(),
            owner_id: UserId::new(),
            created_at: Utc::now(),
        };
        let patch = StorePatch {
            address: Some(" 200 New Plaza ".into()),
            ..Default::default()
        }
        .validated()
        .unwrap();

        patch.apply_to(&mut store);
        assert_eq!(store.address, "200 New Plaza");
        assert_eq!(store.name, "Tech Electronics Store");
    }
}
