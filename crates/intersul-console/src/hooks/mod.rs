//! Cached wrappers around the resource proxies.
//!
//! Each hook set owns a cheap clone of the [`ApiClient`](intersul_client::ApiClient)
//! and the [`QueryCache`](intersul_query::QueryCache). Reads go through the
//! cache under the resource's keys and staleness windows; writes refresh the
//! affected keys once the server confirms them.

mod auth;
mod catalog;
mod categories;
mod clients;
mod dashboard;
mod franchises;
mod installed;
mod services;
mod users;

use std::time::Duration;

use tracing::error;

use crate::error::Result;

pub use auth::{AUTH_PREFIX, AuthHooksApi};
pub use catalog::{CATALOG_DETAIL, CATALOG_PREFIX, CatalogHooks};
pub use categories::{CATEGORIES_PREFIX, CATEGORY_DETAIL, CategoryHooks};
pub use clients::{CLIENTS_PREFIX, ClientHooks, MIN_SEARCH_LEN};
pub use dashboard::DashboardHooks;
pub use franchises::{FRANCHISES_PREFIX, FranchiseHooks};
pub use installed::{INSTALLED_DETAIL, INSTALLED_PREFIX, InstalledMachineHooks};
pub use services::{SERVICE_DETAIL, SERVICES_PREFIX, ServiceHooks};
pub use users::{USERS_PREFIX, UserHooks};

pub(crate) const fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

/// Log a failed write and hand the error on.
pub(crate) fn logged<T>(action: &'static str, result: intersul_client::Result<T>) -> Result<T> {
    result.map_err(|e| {
        error!(action = action, error = %e, "Mutation failed");
        e.into()
    })
}
