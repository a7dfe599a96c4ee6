//! Clients.

use intersul_client::ApiClient;
use intersul_query::{KeySegment, QueryCache, QueryKey, QueryOptions, query_key};
use intersul_types::{
    Client, ClientQuery, ClientStats, CreateClientRequest, EntityId, UpdateClientRequest,
};
use tracing::debug;

use super::{logged, minutes};
use crate::error::Result;

pub const CLIENTS_PREFIX: &str = "clients";

/// Searches shorter than this never reach the server.
pub const MIN_SEARCH_LEN: usize = 2;

pub struct ClientHooks {
    client: ApiClient,
    cache: QueryCache,
}

impl ClientHooks {
    pub(crate) fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    pub fn list_key(query: &ClientQuery) -> QueryKey {
        query_key![CLIENTS_PREFIX, KeySegment::json(query)]
    }

    pub fn detail_key(id: EntityId) -> QueryKey {
        query_key![CLIENTS_PREFIX, id]
    }

    pub async fn list(&self, query: &ClientQuery) -> Result<Vec<Client>> {
        let api = self.client.clients();
        let clients = self
            .cache
            .fetch(
                Self::list_key(query),
                QueryOptions::new().stale_time(minutes(2)),
                || async move { api.list(query).await },
            )
            .await?;
        Ok(clients)
    }

    pub async fn get(&self, id: EntityId) -> Result<Client> {
        let api = self.client.clients();
        let client = self
            .cache
            .fetch(
                Self::detail_key(id),
                QueryOptions::new().stale_time(minutes(5)),
                || async move { api.get(id).await },
            )
            .await?;
        Ok(client)
    }

    pub async fn stats(&self) -> Result<ClientStats> {
        let api = self.client.clients();
        let stats = self
            .cache
            .fetch(
                query_key![CLIENTS_PREFIX, "stats"],
                QueryOptions::new().stale_time(minutes(5)),
                || async move { api.stats().await },
            )
            .await?;
        Ok(stats)
    }

    /// Clients matching `q`.
    ///
    /// Below [`MIN_SEARCH_LEN`] characters only an earlier cached result
    /// for the same text is returned, and nothing is fetched.
    pub async fn search(&self, q: &str) -> Result<Vec<Client>> {
        let enabled = q.chars().count() >= MIN_SEARCH_LEN;
        if !enabled {
            debug!(query = q, "Search too short, not fetching");
        }
        let api = self.client.clients();
        let found = self
            .cache
            .query(
                query_key![CLIENTS_PREFIX, "search", q],
                QueryOptions::new().stale_time(minutes(1)).enabled(enabled),
                || async move { api.search(q).await },
            )
            .await?;
        Ok(found.unwrap_or_default())
    }

    pub async fn create(&self, request: &CreateClientRequest) -> Result<Client> {
        let created = logged("create client", self.client.clients().create(request).await)?;
        self.cache.invalidate(&query_key![CLIENTS_PREFIX]).await;
        Ok(created)
    }

    pub async fn update(&self, id: EntityId, request: &UpdateClientRequest) -> Result<Client> {
        let updated = logged("update client", self.client.clients().update(id, request).await)?;
        self.cache
            .set_entry(Self::detail_key(updated.id), serde_json::to_value(&updated)?)
            .await;
        self.cache.invalidate(&query_key![CLIENTS_PREFIX]).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        logged("delete client", self.client.clients().delete(id).await)?;
        self.cache.remove_entry(&Self::detail_key(id)).await;
        self.cache.invalidate(&query_key![CLIENTS_PREFIX]).await;
        Ok(())
    }
}
