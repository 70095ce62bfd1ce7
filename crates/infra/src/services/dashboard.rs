//! Admin and owner dashboards.

use std::sync::Arc;

use storerate_auth::{Identity, Operation};
use storerate_catalog::{DashboardStats, OwnerDashboardEntry, Rating};
use storerate_core::{DomainResult, StoreId};

use super::{guard, users_by_id};
use crate::repository::Repository;

#[derive(Clone)]
pub struct DashboardService {
    repo: Arc<dyn Repository>,
}

impl DashboardService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// System-wide totals. Each count is a separate read, so the three numbers
    /// may straddle a concurrent write.
    pub async fn stats(&self, identity: Option<&Identity>) -> DomainResult<DashboardStats> {
        guard(identity, Operation::DashboardStats, None)?;

        Ok(DashboardStats {
            total_users: self.repo.count_users().await?,
            total_stores: self.repo.count_stores().await?,
            total_ratings: self.repo.count_ratings().await?,
        })
    }

    /// Every store the caller owns, with its raters.
    pub async fn owner_dashboard(
        &self,
        identity: Option<&Identity>,
    ) -> DomainResult<Vec<OwnerDashboardEntry>> {
        let caller = guard(identity, Operation::OwnerDashboard, None)?;

        let stores = self.repo.stores_by_owners(&[caller.user_id]).await?;
        let ids: Vec<StoreId> = stores.iter().map(|s| s.id).collect();
        let ratings = self.repo.ratings_for_stores(&ids).await?;
        let users = users_by_id(self.repo.as_ref(), ratings.iter().map(|r| r.user_id)).await?;

        Ok(stores
            .iter()
            .map(|store| {
                let own: Vec<Rating> = ratings
                    .iter()
                    .filter(|r| r.store_id == store.id)
                    .cloned()
                    .collect();
                OwnerDashboardEntry::new(store, &own, &users)
            })
            .collect())
    }
}
