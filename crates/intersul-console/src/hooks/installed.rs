//! Machines installed at client sites.

use intersul_client::ApiClient;
use intersul_query::{QueryCache, QueryKey, QueryOptions, query_key};
use intersul_types::{
    ClientCopyMachine, CreateClientCopyMachineRequest, EntityId, UpdateClientCopyMachineRequest,
};

use super::{logged, minutes};
use crate::error::Result;

pub const INSTALLED_PREFIX: &str = "client-copy-machines";
pub const INSTALLED_DETAIL: &str = "client-copy-machine";

pub struct InstalledMachineHooks {
    client: ApiClient,
    cache: QueryCache,
}

impl InstalledMachineHooks {
    pub(crate) fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    pub fn by_client_key(client_id: EntityId) -> QueryKey {
        query_key![INSTALLED_PREFIX, client_id]
    }

    pub fn detail_key(id: EntityId) -> QueryKey {
        query_key![INSTALLED_DETAIL, id]
    }

    pub async fn by_client(&self, client_id: EntityId) -> Result<Vec<ClientCopyMachine>> {
        let api = self.client.copy_machines().installed();
        let machines = self
            .cache
            .fetch(
                Self::by_client_key(client_id),
                QueryOptions::new().stale_time(minutes(5)).gc_time(minutes(10)),
                || async move { api.by_client(client_id).await },
            )
            .await?;
        Ok(machines)
    }

    pub async fn get(&self, id: EntityId) -> Result<ClientCopyMachine> {
        let api = self.client.copy_machines().installed();
        let machine = self
            .cache
            .fetch(
                Self::detail_key(id),
                QueryOptions::new().stale_time(minutes(10)).gc_time(minutes(15)),
                || async move { api.get(id).await },
            )
            .await?;
        Ok(machine)
    }

    pub async fn create(&self, request: &CreateClientCopyMachineRequest) -> Result<ClientCopyMachine> {
        let created = logged(
            "install machine",
            self.client.copy_machines().installed().create(request).await,
        )?;
        self.cache.invalidate(&query_key![INSTALLED_PREFIX]).await;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: EntityId,
        request: &UpdateClientCopyMachineRequest,
    ) -> Result<ClientCopyMachine> {
        let updated = logged(
            "update installed machine",
            self.client.copy_machines().installed().update(id, request).await,
        )?;
        self.cache.invalidate(&query_key![INSTALLED_PREFIX]).await;
        self.cache.invalidate(&Self::detail_key(id)).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        logged(
            "remove installed machine",
            self.client.copy_machines().installed().delete(id).await,
        )?;
        self.cache.invalidate(&query_key![INSTALLED_PREFIX]).await;
        Ok(())
    }
}
