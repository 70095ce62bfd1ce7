//! Aggregation engine.
//!
//! Averages and counts are always derived from raw rating rows on read and
//! never stored, so they cannot drift from the ratings they summarize.
//!
//! Rounding: one decimal place, half away from zero (4.25 → 4.3). The
//! arithmetic stays in integers so boundary cases are exact.

use std::collections::HashMap;

use serde::Serialize;

use storerate_core::StoreId;

use crate::model::{Rating, RatingValue};

/// Count and sum of a set of rating values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RatingStats {
    count: u64,
    sum: u64,
}

impl RatingStats {
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = RatingValue>,
    {
        let mut stats = Self::default();
        for v in values {
            stats.record(v);
        }
        stats
    }

    pub fn record(&mut self, value: RatingValue) {
        self.count += 1;
        self.sum += u64::from(value.get());
    }

    pub fn total_ratings(&self) -> u64 {
        self.count
    }

    /// Average in tenths of a star (45 means 4.5); 0 when there are no ratings.
    pub fn average_tenths(&self) -> u64 {
        if self.count == 0 {
            return 0;
        }
        // floor(10 * sum / count + 1/2)
        (20 * self.sum + self.count) / (2 * self.count)
    }

    pub fn average_rating(&self) -> f64 {
        self.average_tenths() as f64 / 10.0
    }
}

/// Group ratings by store. Stores without ratings are absent from the map;
/// callers treat a missing entry as `RatingStats::default()`.
pub fn stats_by_store<'a, I>(ratings: I) -> HashMap<StoreId, RatingStats>
where
    I: IntoIterator<Item = &'a Rating>,
{
    let mut by_store: HashMap<StoreId, RatingStats> = HashMap::new();
    for rating in ratings {
        by_store.entry(rating.store_id).or_default().record(rating.value);
    }
    by_store
}

/// System-wide totals for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_stores: u64,
    pub total_ratings: u64,
}
