//! Service orders, their steps and service categories.

use intersul_client::ApiClient;
use intersul_query::{KeySegment, QueryCache, QueryKey, QueryOptions, query_key};
use intersul_types::{
    CreateServiceCategoryRequest, CreateServiceRequest, CreateStepRequest, EntityId, Service,
    ServiceCategory, ServiceQuery, ServiceStats, ServiceStep, UpdateServiceRequest,
    UpdateStepRequest,
};

use super::{logged, minutes};
use crate::error::Result;

pub const SERVICES_PREFIX: &str = "services";

/// Key prefix refreshed after step changes, alongside [`SERVICES_PREFIX`].
pub const SERVICE_DETAIL: &str = "service";

pub struct ServiceHooks {
    client: ApiClient,
    cache: QueryCache,
}

impl ServiceHooks {
    pub(crate) fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    pub fn list_key(query: &ServiceQuery) -> QueryKey {
        query_key![SERVICES_PREFIX, KeySegment::json(query)]
    }

    pub fn detail_key(id: EntityId) -> QueryKey {
        query_key![SERVICES_PREFIX, id]
    }

    pub fn categories_key() -> QueryKey {
        query_key![SERVICES_PREFIX, "categories"]
    }

    pub async fn list(&self, query: &ServiceQuery) -> Result<Vec<Service>> {
        let api = self.client.services();
        let services = self
            .cache
            .fetch(
                Self::list_key(query),
                QueryOptions::new().stale_time(minutes(2)),
                || async move { api.list(query).await },
            )
            .await?;
        Ok(services)
    }

    pub async fn get(&self, id: EntityId) -> Result<Service> {
        let api = self.client.services();
        let service = self
            .cache
            .fetch(
                Self::detail_key(id),
                QueryOptions::new().stale_time(minutes(5)),
                || async move { api.get(id).await },
            )
            .await?;
        Ok(service)
    }

    pub async fn stats(&self) -> Result<ServiceStats> {
        let api = self.client.services();
        let stats = self
            .cache
            .fetch(
                query_key![SERVICES_PREFIX, "stats"],
                QueryOptions::new().stale_time(minutes(5)),
                || async move { api.stats().await },
            )
            .await?;
        Ok(stats)
    }

    pub async fn categories(&self) -> Result<Vec<ServiceCategory>> {
        let api = self.client.services();
        let categories = self
            .cache
            .fetch(
                Self::categories_key(),
                QueryOptions::new().stale_time(minutes(10)),
                || async move { api.categories().await },
            )
            .await?;
        Ok(categories)
    }

    pub async fn create(&self, request: &CreateServiceRequest) -> Result<Service> {
        let created = logged("create service", self.client.services().create(request).await)?;
        self.cache.invalidate(&query_key![SERVICES_PREFIX]).await;
        Ok(created)
    }

    pub async fn update(&self, id: EntityId, request: &UpdateServiceRequest) -> Result<Service> {
        let updated = logged("update service", self.client.services().update(id, request).await)?;
        self.cache
            .set_entry(Self::detail_key(updated.id), serde_json::to_value(&updated)?)
            .await;
        self.cache.invalidate(&query_key![SERVICES_PREFIX]).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        logged("delete service", self.client.services().delete(id).await)?;
        self.cache.remove_entry(&Self::detail_key(id)).await;
        self.cache.invalidate(&query_key![SERVICES_PREFIX]).await;
        Ok(())
    }

    pub async fn create_category(
        &self,
        request: &CreateServiceCategoryRequest,
    ) -> Result<ServiceCategory> {
        let created = logged(
            "create service category",
            self.client.services().create_category(request).await,
        )?;
        self.cache.invalidate(&Self::categories_key()).await;
        Ok(created)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Steps
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn create_step(
        &self,
        service_id: EntityId,
        request: &CreateStepRequest,
    ) -> Result<ServiceStep> {
        let step = logged(
            "create step",
            self.client.services().create_step(service_id, request).await,
        )?;
        self.steps_changed(service_id).await;
        Ok(step)
    }

    pub async fn update_step(
        &self,
        service_id: EntityId,
        step_id: EntityId,
        request: &UpdateStepRequest,
    ) -> Result<ServiceStep> {
        let step = logged(
            "update step",
            self.client
                .services()
                .update_step(service_id, step_id, request)
                .await,
        )?;
        self.steps_changed(service_id).await;
        Ok(step)
    }

    pub async fn delete_step(&self, service_id: EntityId, step_id: EntityId) -> Result<()> {
        logged(
            "delete step",
            self.client.services().delete_step(service_id, step_id).await,
        )?;
        self.steps_changed(service_id).await;
        Ok(())
    }

    async fn steps_changed(&self, service_id: EntityId) {
        self.cache
            .invalidate(&query_key![SERVICE_DETAIL, service_id])
            .await;
        self.cache.invalidate(&query_key![SERVICES_PREFIX]).await;
    }
}
