//! Services API, including service steps and service categories.

use intersul_types::{
    CreateServiceCategoryRequest, CreateServiceRequest, CreateStepRequest, EntityId, Service,
    ServiceCategory, ServiceQuery, ServiceStats, ServiceStep, UpdateServiceRequest,
    UpdateStepRequest,
};

use crate::client::ApiClient;
use crate::error::Result;

/// Services API client.
pub struct ServicesApi {
    client: ApiClient,
}

impl ServicesApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ServiceQuery) -> Result<Vec<Service>> {
        self.client.get_with_query("services", query).await
    }

    pub async fn get(&self, id: EntityId) -> Result<Service> {
        self.client.get(&format!("services/{}", id)).await
    }

    pub async fn create(&self, request: &CreateServiceRequest) -> Result<Service> {
        self.client.post("services", request).await
    }

    pub async fn update(&self, id: EntityId, request: &UpdateServiceRequest) -> Result<Service> {
        self.client.patch(&format!("services/{}", id), request).await
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        self.client.delete(&format!("services/{}", id)).await
    }

    pub async fn stats(&self) -> Result<ServiceStats> {
        self.client.get("services/stats").await
    }

    pub async fn categories(&self) -> Result<Vec<ServiceCategory>> {
        self.client.get("services/categories").await
    }

    pub async fn create_category(
        &self,
        request: &CreateServiceCategoryRequest,
    ) -> Result<ServiceCategory> {
        self.client.post("services/categories", request).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Steps
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn create_step(
        &self,
        service_id: EntityId,
        request: &CreateStepRequest,
    ) -> Result<ServiceStep> {
        self.client
            .post(&format!("services/{}/steps", service_id), request)
            .await
    }

    pub async fn update_step(
        &self,
        service_id: EntityId,
        step_id: EntityId,
        request: &UpdateStepRequest,
    ) -> Result<ServiceStep> {
        self.client
            .patch(&format!("services/{}/steps/{}", service_id, step_id), request)
            .await
    }

    pub async fn delete_step(&self, service_id: EntityId, step_id: EntityId) -> Result<()> {
        self.client
            .delete(&format!("services/{}/steps/{}", service_id, step_id))
            .await
    }
}
