//! `storerate-catalog` - users, stores and ratings.
//!
//! Records, filter/sort rules, the aggregation engine and read projections.
//! Pure domain logic: no IO, no HTTP, no storage.

pub mod listing;
pub mod model;
pub mod query;
pub mod stats;

pub use listing::{
    OwnedStoreSummary, OwnerDashboardEntry, Rater, RaterProfile, StoreDetail, StoreListing,
    StoreRatingEntry, UserListing, UserProfile, UserSummary, rating_entries,
};
pub use model::{NewStore, NewUser, Rating, RatingValue, Store, StorePatch, User, normalize_email};
pub use query::{
    Sort, SortOrder, StoreFilter, StoreQuery, StoreSortField, UserFilter, UserQuery, UserSortField,
};
pub use stats::{DashboardStats, RatingStats, stats_by_store};
