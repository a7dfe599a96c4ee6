//! Dashboard aggregate.

use serde::{Deserialize, Serialize};

use crate::auth::UserStats;
use crate::client::ClientStats;
use crate::copy_machine::CopyMachineStats;
use crate::service::ServiceStats;

/// Headline numbers for the dashboard, gathered from the per-resource
/// statistics endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub clients: ClientStats,
    pub services: ServiceStats,
    pub users: UserStats,
    pub copy_machines: CopyMachineStats,
}
