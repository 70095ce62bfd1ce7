//! Read-side projections returned to callers.
//!
//! Every aggregate here is computed from the rating rows handed in; nothing
//! is cached on the records themselves.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use storerate_auth::Role;
use storerate_core::{RatingId, StoreId, UserId};

use crate::model::{Rating, Store, User};
use crate::stats::RatingStats;

/// A user without the credential hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            address: user.address.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Rater details shown next to a rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaterProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub address: String,
}

impl From<&User> for RaterProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            address: user.address.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRatingEntry {
    pub id: RatingId,
    pub value: u8,
    pub user: RaterProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join ratings with their raters, newest first. Ratings whose rater is not
/// in `users` are skipped.
pub fn rating_entries(ratings: &[Rating], users: &HashMap<UserId, User>) -> Vec<StoreRatingEntry> {
    let mut entries: Vec<StoreRatingEntry> = ratings
        .iter()
        .filter_map(|r| {
            users.get(&r.user_id).map(|u| StoreRatingEntry {
                id: r.id,
                value: r.value.get(),
                user: RaterProfile::from(u),
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
        })
        .collect();
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    entries
}

// ─────────────────────────────────────────────────────────────────────────────
// Stores
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListing {
    pub id: StoreId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner: Option<UserSummary>,
    pub average_rating: f64,
    pub total_ratings: u64,
    /// Outer `None`: caller is not a USER, field omitted.
    /// `Some(None)`: a USER who has not rated this store, serialized as null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<Option<u8>>,
    pub created_at: DateTime<Utc>,
}

impl StoreListing {
    pub fn new(
        store: &Store,
        owner: Option<&User>,
        stats: RatingStats,
        user_rating: Option<Option<u8>>,
    ) -> Self {
        Self {
            id: store.id,
            name: store.name.clone(),
            email: store.email.clone(),
            address: store.address.clone(),
            owner: owner.map(UserSummary::from),
            average_rating: stats.average_rating(),
            total_ratings: stats.total_ratings(),
            user_rating,
            created_at: store.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDetail {
    pub id: StoreId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner: Option<UserSummary>,
    pub average_rating: f64,
    pub total_ratings: u64,
    pub created_at: DateTime<Utc>,
    pub ratings: Vec<StoreRatingEntry>,
}

impl StoreDetail {
    /// `ratings` must be exactly the ratings of `store`.
    pub fn new(
        store: &Store,
        owner: Option<&User>,
        ratings: &[Rating],
        users: &HashMap<UserId, User>,
    ) -> Self {
        let stats = RatingStats::from_values(ratings.iter().map(|r| r.value));
        Self {
            id: store.id,
            name: store.name.clone(),
            email: store.email.clone(),
            address: store.address.clone(),
            owner: owner.map(UserSummary::from),
            average_rating: stats.average_rating(),
            total_ratings: stats.total_ratings(),
            created_at: store.created_at,
            ratings: rating_entries(ratings, users),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rater {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub rating: u8,
    pub rated_at: DateTime<Utc>,
}

/// One owned store as seen on the owner dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDashboardEntry {
    pub id: StoreId,
    pub name: String,
    pub email: String,
    pub address: String,
    pub average_rating: f64,
    pub total_ratings: u64,
    pub raters: Vec<Rater>,
}

impl OwnerDashboardEntry {
    pub fn new(store: &Store, ratings: &[Rating], users: &HashMap<UserId, User>) -> Self {
        let stats = RatingStats::from_values(ratings.iter().map(|r| r.value));
        let raters = rating_entries(ratings, users)
            .into_iter()
            .map(|e| Rater {
                id: e.user.id,
                name: e.user.name,
                email: e.user.email,
                address: e.user.address,
                rating: e.value,
                rated_at: e.updated_at,
            })
            .collect();
        Self {
            id: store.id,
            name: store.name.clone(),
            email: store.email.clone(),
            address: store.address.clone(),
            average_rating: stats.average_rating(),
            total_ratings: stats.total_ratings(),
            raters,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedStoreSummary {
    pub id: StoreId,
    pub name: String,
    pub average_rating: f64,
    pub total_ratings: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListing {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<OwnedStoreSummary>,
}

impl UserListing {
    pub fn new(user: &User, owned: Option<(&Store, RatingStats)>) -> Self {
        Self {
            profile: UserProfile::from(user),
            store: owned.map(|(store, stats)| OwnedStoreSummary {
                id: store.id,
                name: store.name.clone(),
                average_rating: stats.average_rating(),
                total_ratings: stats.total_ratings(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RatingValue;
    use chrono::Duration;

    fn user(name: &str, role: Role) -> User {
        User {
            id: UserId::new(),
            name: name.into(),
            email: format!("{}@stores.com", name.split(' ').next().unwrap_or("x").to_lowercase()),
            address: "456 User Avenue".into(),
            role,
            credential_hash: "$argon2id$opaque".into(),
            created_at: Utc::now(),
        }
    }

    fn store(owner: &User) -> Store {
        Store {
            id: StoreId::new(),
            name: "Tech Electronics Store".into(),
            email: "contact@techstore.com".into(),
            address: "100 Tech Plaza".into(),
            owner_id: owner.id,
            created_at: Utc::now(),
        }
    }

    fn rating(store: &Store, user: &User, v: i64, age_minutes: i64) -> Rating {
        let at = Utc::now() - Duration::minutes(age_minutes);
        Rating {
            id: RatingId::new(),
            value: RatingValue::new(v).unwrap(),
            user_id: user.id,
            store_id: store.id,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn profile_never_carries_the_credential_hash() {
        let u = user("Regular User Account for Testing", Role::User);
        let json = serde_json::to_string(&UserProfile::from(&u)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"USER\""));
    }

    #[test]
    fn user_rating_is_omitted_for_non_users_and_null_when_unrated() {
        let owner = user("Store Owner One Account Testing", Role::StoreOwner);
        let s = store(&owner);

        let admin_view = StoreListing::new(&s, Some(&owner), RatingStats::default(), None);
        let json = serde_json::to_value(&admin_view).unwrap();
        assert!(json.get("userRating").is_none());
        assert_eq!(json["averageRating"], 0.0);
        assert_eq!(json["totalRatings"], 0);

        let unrated = StoreListing::new(&s, Some(&owner), RatingStats::default(), Some(None));
        let json = serde_json::to_value(&unrated).unwrap();
        assert!(json["userRating"].is_null());
        assert!(json.as_object().unwrap().contains_key("userRating"));

        let rated = StoreListing::new(&s, Some(&owner), RatingStats::default(), Some(Some(4)));
        assert_eq!(serde_json::to_value(&rated).unwrap()["userRating"], 4);
    }

    #[test]
    fn detail_aggregates_and_orders_newest_first() {
        let owner = user("Store Owner One Account Testing", Role::StoreOwner);
        let alice = user("Alice Regular User For Testing", Role::User);
        let bob = user("Bobby Regular User For Testing", Role::User);
        let s = store(&owner);
        let ratings = vec![rating(&s, &alice, 5, 10), rating(&s, &bob, 4, 1)];
        let users: HashMap<_, _> = [alice.clone(), bob.clone()]
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let detail = StoreDetail::new(&s, Some(&owner), &ratings, &users);
        assert_eq!(detail.average_rating, 4.5);
        assert_eq!(detail.total_ratings, 2);
        assert_eq!(detail.ratings[0].user.id, bob.id);
        assert_eq!(detail.ratings[1].user.id, alice.id);
    }

    #[test]
    fn owner_dashboard_lists_raters_with_their_values() {
        let owner = user("Store Owner One Account Testing", Role::StoreOwner);
        let alice = user("Alice Regular User For Testing", Role::User);
        let s = store(&owner);
        let ratings = vec![rating(&s, &alice, 3, 0)];
        let users: HashMap<_, _> = [(alice.id, alice.clone())].into_iter().collect();

        let entry = OwnerDashboardEntry::new(&s, &ratings, &users);
        assert_eq!(entry.total_ratings, 1);
        assert_eq!(entry.raters.len(), 1);
        assert_eq!(entry.raters[0].rating, 3);
        assert_eq!(entry.raters[0].address, "456 User Avenue");

        let json = serde_json::to_value(&entry).unwrap();
        assert!(json["raters"][0].get("ratedAt").is_some());
    }

    #[test]
    fn user_listing_flattens_profile_and_nests_store() {
        let owner = user("Store Owner One Account Testing", Role::StoreOwner);
        let s = store(&owner);
        let stats = RatingStats::from_values([RatingValue::new(5).unwrap()]);

        let json = serde_json::to_value(UserListing::new(&owner, Some((&s, stats)))).unwrap();
        assert_eq!(json["role"], "STORE_OWNER");
        assert_eq!(json["store"]["name"], "Tech Electronics Store");
        assert_eq!(json["store"]["averageRating"], 5.0);

        let plain = user("Regular User Account for Testing", Role::User);
        let json = serde_json::to_value(UserListing::new(&plain, None)).unwrap();
        assert!(json.get("store").is_none());
    }
}
