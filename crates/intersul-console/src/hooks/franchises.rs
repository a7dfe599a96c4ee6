//! Franchise plans.

use intersul_client::ApiClient;
use intersul_query::{QueryCache, QueryKey, QueryOptions, query_key};
use intersul_types::{CreateFranchiseRequest, EntityId, Franchise, UpdateFranchiseRequest};

use super::{logged, minutes};
use crate::error::Result;

pub const FRANCHISES_PREFIX: &str = "franchises";

pub struct FranchiseHooks {
    client: ApiClient,
    cache: QueryCache,
}

impl FranchiseHooks {
    pub(crate) fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    /// Details live under the list prefix so one invalidation covers both.
    pub fn detail_key(id: EntityId) -> QueryKey {
        query_key![FRANCHISES_PREFIX, id]
    }

    pub async fn list(&self) -> Result<Vec<Franchise>> {
        let api = self.client.copy_machines().franchises();
        let franchises = self
            .cache
            .fetch(
                query_key![FRANCHISES_PREFIX],
                QueryOptions::new().stale_time(minutes(5)),
                || async move { api.list().await },
            )
            .await?;
        Ok(franchises)
    }

    pub async fn get(&self, id: EntityId) -> Result<Franchise> {
        let api = self.client.copy_machines().franchises();
        let franchise = self
            .cache
            .fetch(
                Self::detail_key(id),
                QueryOptions::new().stale_time(minutes(5)),
                || async move { api.get(id).await },
            )
            .await?;
        Ok(franchise)
    }

    pub async fn create(&self, request: &CreateFranchiseRequest) -> Result<Franchise> {
        let created = logged(
            "create franchise",
            self.client.copy_machines().franchises().create(request).await,
        )?;
        self.refresh().await;
        Ok(created)
    }

    pub async fn update(&self, id: EntityId, request: &UpdateFranchiseRequest) -> Result<Franchise> {
        let updated = logged(
            "update franchise",
            self.client.copy_machines().franchises().update(id, request).await,
        )?;
        self.refresh().await;
        Ok(updated)
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        logged(
            "delete franchise",
            self.client.copy_machines().franchises().delete(id).await,
        )?;
        self.refresh().await;
        Ok(())
    }

    async fn refresh(&self) {
        self.cache.invalidate(&query_key![FRANCHISES_PREFIX]).await;
    }
}
