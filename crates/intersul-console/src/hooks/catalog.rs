//! Copy-machine catalog.
//!
//! The catalog list is the one view with optimistic writes: creates, updates
//! and deletes show up in every cached page immediately and are rolled back
//! if the server refuses them.

use intersul_client::{ApiClient, CatalogListQuery, FileUpload};
use intersul_query::{OptimisticMutation, QueryCache, QueryKey, QueryOptions, Speculation, query_key};
use intersul_types::{
    CopyMachineCatalog, CreateCatalogRequest, EntityId, Paginated, UpdateCatalogRequest,
};

use super::minutes;
use crate::error::Result;

pub const CATALOG_PREFIX: &str = "copy-machines";
pub const CATALOG_DETAIL: &str = "copy-machine";

pub struct CatalogHooks {
    client: ApiClient,
    cache: QueryCache,
}

impl CatalogHooks {
    pub(crate) fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    /// `["copy-machines", search, page, limit]`. An empty search is no search.
    pub fn list_key(search: Option<&str>, page: u32, limit: u32) -> QueryKey {
        query_key![
            CATALOG_PREFIX,
            search.filter(|s| !s.is_empty()),
            page,
            limit
        ]
    }

    pub fn detail_key(id: EntityId) -> QueryKey {
        query_key![CATALOG_DETAIL, id]
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<Paginated<CopyMachineCatalog>> {
        let query = CatalogListQuery::new(search, page, limit);
        let api = self.client.copy_machines().catalog();
        let options = QueryOptions::new().stale_time(minutes(5)).gc_time(minutes(10));
        let page = self
            .cache
            .fetch(Self::list_key(search, page, limit), options, || async move {
                api.list(&query).await
            })
            .await?;
        Ok(page)
    }

    pub async fn get(&self, id: EntityId) -> Result<CopyMachineCatalog> {
        let api = self.client.copy_machines().catalog();
        let options = QueryOptions::new().stale_time(minutes(10)).gc_time(minutes(15));
        let machine = self
            .cache
            .fetch(Self::detail_key(id), options, || async move { api.get(id).await })
            .await?;
        Ok(machine)
    }

    pub async fn create(&self, request: &CreateCatalogRequest) -> Result<CopyMachineCatalog> {
        let api = self.client.copy_machines().catalog();
        let created = self
            .mutation()
            .run(Speculation::create(request)?, api.create(request))
            .await?;
        Ok(created)
    }

    /// Create with an attached file. The speculative row carries the form
    /// fields only.
    pub async fn create_with_file(
        &self,
        request: &CreateCatalogRequest,
        upload: FileUpload,
    ) -> Result<CopyMachineCatalog> {
        let api = self.client.copy_machines().catalog();
        let created = self
            .mutation()
            .run(
                Speculation::create(request)?,
                api.create_with_file(request, upload),
            )
            .await?;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: EntityId,
        request: &UpdateCatalogRequest,
    ) -> Result<CopyMachineCatalog> {
        let api = self.client.copy_machines().catalog();
        let updated = self
            .mutation()
            .run(Speculation::update(id, request)?, api.update(id, request))
            .await?;
        Ok(updated)
    }

    pub async fn update_with_file(
        &self,
        id: EntityId,
        request: &UpdateCatalogRequest,
        upload: FileUpload,
    ) -> Result<CopyMachineCatalog> {
        let api = self.client.copy_machines().catalog();
        let updated = self
            .mutation()
            .run(
                Speculation::update(id, request)?,
                api.update_with_file(id, request, upload),
            )
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        let api = self.client.copy_machines().catalog();
        self.mutation()
            .run(Speculation::delete(id), api.delete(id))
            .await?;
        Ok(())
    }

    fn mutation(&self) -> OptimisticMutation<'_> {
        OptimisticMutation::new(&self.cache, query_key![CATALOG_PREFIX]).with_detail(Self::detail_key)
    }
}
