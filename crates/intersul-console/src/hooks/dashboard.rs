//! Dashboard headline numbers.

use intersul_client::ApiClient;
use intersul_query::{QueryCache, QueryOptions, query_key};
use intersul_types::{CopyMachineStats, DashboardStats};
use tracing::warn;

use super::minutes;
use crate::error::Result;

pub struct DashboardHooks {
    client: ApiClient,
    cache: QueryCache,
}

impl DashboardHooks {
    pub(crate) fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    /// Per-resource statistics, fetched concurrently.
    ///
    /// The fleet counters are best effort: if that endpoint fails the
    /// dashboard still loads with zeroed machine counts.
    pub async fn stats(&self) -> Result<DashboardStats> {
        let client = self.client.clone();
        let stats = self
            .cache
            .fetch(
                query_key!["dashboard", "stats"],
                QueryOptions::new().stale_time(minutes(5)),
                || async move {
                    let clients_api = client.clients();
                    let services_api = client.services();
                    let users_api = client.users();
                    let machines_api = client.copy_machines();
                    let (clients, services, users, machines) = futures::join!(
                        clients_api.stats(),
                        services_api.stats(),
                        users_api.stats(),
                        machines_api.stats(),
                    );
                    let clients = clients?;
                    let copy_machines = machines.unwrap_or_else(|e| {
                        warn!(error = %e, "Fleet statistics unavailable");
                        CopyMachineStats {
                            total_clients: clients.total,
                            ..Default::default()
                        }
                    });
                    Ok::<_, intersul_client::Error>(DashboardStats {
                        clients,
                        services: services?,
                        users: users?,
                        copy_machines,
                    })
                },
            )
            .await?;
        Ok(stats)
    }
}
