//! Copy-machine catalog, installed machines and franchise plans.

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::common::{EntityId, impl_entity};

/// A machine model offered in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyMachineCatalog {
    pub id: EntityId,
    pub model: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    /// Uploaded image or brochure reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// A catalog machine installed at a client site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientCopyMachine {
    pub id: EntityId,
    pub client: Client,
    pub catalog: CopyMachineCatalog,
    pub serial_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_expiry: Option<String>,
    #[serde(default)]
    pub status: ClientCopyMachineStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_maintenance_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_maintenance_date: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientCopyMachineStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
    Repair,
    Retired,
}

/// A franchise (copy allowance) plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Franchise {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    /// Months.
    pub duration: u32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_copies: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_copies: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_white_copies: Option<u64>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl_entity!(CopyMachineCatalog, ClientCopyMachine, Franchise);

/// Payload for `POST /copy-machines/catalog`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateCatalogRequest {
    pub model: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Payload for `PATCH /copy-machines/catalog/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCatalogRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Payload for `POST /copy-machines/client`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateClientCopyMachineRequest {
    pub client_id: EntityId,
    pub catalog_id: EntityId,
    pub serial_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payload for `PATCH /copy-machines/client/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClientCopyMachineRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClientCopyMachineStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_maintenance_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_maintenance_date: Option<String>,
}

/// Payload for `POST /copy-machines/franchise`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFranchiseRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_copies: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_copies: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_white_copies: Option<u64>,
}

/// Payload for `PATCH /copy-machines/franchise/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFranchiseRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_copies: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_copies: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_white_copies: Option<u64>,
}

/// Fleet-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopyMachineStats {
    pub total_machines: u64,
    pub active_machines: u64,
    pub maintenance_required: u64,
    pub total_clients: u64,
    #[serde(default)]
    pub average_machines_per_client: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_patch_is_sparse() {
        let patch = UpdateCatalogRequest {
            price: Some(12500.0),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({"price": 12500.0})
        );
    }

    #[test]
    fn test_installed_machine_wire_keys() {
        let machine: ClientCopyMachine = serde_json::from_value(serde_json::json!({
            "id": 5,
            "client": {"id": 1, "name": "ACME", "email": "a@acme.com"},
            "catalog": {"id": 2, "model": "X1", "manufacturer": "Kyocera"},
            "serial_number": "SN-001",
            "status": "maintenance",
            "next_maintenance_date": "2025-03-01"
        }))
        .unwrap();

        assert_eq!(machine.serial_number, "SN-001");
        assert_eq!(machine.status, ClientCopyMachineStatus::Maintenance);
        assert_eq!(machine.next_maintenance_date.as_deref(), Some("2025-03-01"));
    }
}
