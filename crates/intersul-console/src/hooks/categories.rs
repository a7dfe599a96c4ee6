//! Equipment categories.

use intersul_client::ApiClient;
use intersul_query::{QueryCache, QueryKey, QueryOptions, query_key};
use intersul_types::{Category, CreateCategoryRequest, EntityId, UpdateCategoryRequest};

use super::{logged, minutes};
use crate::error::Result;

pub const CATEGORIES_PREFIX: &str = "categories";
pub const CATEGORY_DETAIL: &str = "category";

pub struct CategoryHooks {
    client: ApiClient,
    cache: QueryCache,
}

impl CategoryHooks {
    pub(crate) fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    pub fn detail_key(id: EntityId) -> QueryKey {
        query_key![CATEGORY_DETAIL, id]
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        let api = self.client.categories();
        let categories = self
            .cache
            .fetch(
                query_key![CATEGORIES_PREFIX],
                QueryOptions::new().stale_time(minutes(5)),
                || async move { api.list().await },
            )
            .await?;
        Ok(categories)
    }

    pub async fn get(&self, id: EntityId) -> Result<Category> {
        let api = self.client.categories();
        let category = self
            .cache
            .fetch(Self::detail_key(id), QueryOptions::new(), || async move {
                api.get(id).await
            })
            .await?;
        Ok(category)
    }

    pub async fn create(&self, request: &CreateCategoryRequest) -> Result<Category> {
        let created = logged("create category", self.client.categories().create(request).await)?;
        self.cache.invalidate(&query_key![CATEGORIES_PREFIX]).await;
        Ok(created)
    }

    pub async fn update(&self, id: EntityId, request: &UpdateCategoryRequest) -> Result<Category> {
        let updated = logged(
            "update category",
            self.client.categories().update(id, request).await,
        )?;
        self.cache.invalidate(&query_key![CATEGORIES_PREFIX]).await;
        self.cache.invalidate(&Self::detail_key(id)).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        logged("delete category", self.client.categories().delete(id).await)?;
        self.cache.invalidate(&query_key![CATEGORIES_PREFIX]).await;
        Ok(())
    }
}
