//! Clients API.

use serde::Serialize;

use intersul_types::{
    Client, ClientQuery, ClientStats, CreateClientRequest, EntityId, UpdateClientRequest,
};

use crate::client::ApiClient;
use crate::error::Result;

#[derive(Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
}

/// Clients API client.
pub struct ClientsApi {
    client: ApiClient,
}

impl ClientsApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List clients matching the filters.
    pub async fn list(&self, query: &ClientQuery) -> Result<Vec<Client>> {
        self.client.get_with_query("clients", query).await
    }

    /// Get a client by ID.
    pub async fn get(&self, id: EntityId) -> Result<Client> {
        self.client.get(&format!("clients/{}", id)).await
    }

    pub async fn create(&self, request: &CreateClientRequest) -> Result<Client> {
        self.client.post("clients", request).await
    }

    pub async fn update(&self, id: EntityId, request: &UpdateClientRequest) -> Result<Client> {
        self.client.patch(&format!("clients/{}", id), request).await
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        self.client.delete(&format!("clients/{}", id)).await
    }

    pub async fn stats(&self) -> Result<ClientStats> {
        self.client.get("clients/stats").await
    }

    /// Free-text search (`GET /clients/search?q=`).
    pub async fn search(&self, q: &str) -> Result<Vec<Client>> {
        self.client
            .get_with_query("clients/search", &SearchQuery { q })
            .await
    }
}
