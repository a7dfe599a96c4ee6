//! Categories API.

use intersul_types::{Category, CreateCategoryRequest, EntityId, UpdateCategoryRequest};

use crate::client::ApiClient;
use crate::error::Result;

/// Categories API client.
pub struct CategoriesApi {
    client: ApiClient,
}

impl CategoriesApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        self.client.get("categories").await
    }

    pub async fn get(&self, id: EntityId) -> Result<Category> {
        self.client.get(&format!("categories/{}", id)).await
    }

    pub async fn create(&self, request: &CreateCategoryRequest) -> Result<Category> {
        self.client.post("categories", request).await
    }

    pub async fn update(&self, id: EntityId, request: &UpdateCategoryRequest) -> Result<Category> {
        self.client.patch(&format!("categories/{}", id), request).await
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        self.client.delete(&format!("categories/{}", id)).await
    }
}
