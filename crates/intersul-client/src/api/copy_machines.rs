//! Copy-machines API: catalog, machines installed at clients, franchise plans.

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use intersul_types::{
    ClientCopyMachine, CopyMachineCatalog, CopyMachineStats, CreateCatalogRequest,
    CreateClientCopyMachineRequest, CreateFranchiseRequest, EntityId, Franchise, Paginated,
    UpdateCatalogRequest, UpdateClientCopyMachineRequest, UpdateFranchiseRequest,
};

use crate::client::ApiClient;
use crate::error::{Error, Result};

/// Default catalog page size.
pub const DEFAULT_CATALOG_LIMIT: u32 = 10;

/// Query parameters for listing the catalog.
///
/// `search` is only sent when non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogListQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl CatalogListQuery {
    pub fn new(search: Option<&str>, page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            search: search.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }
}

impl Default for CatalogListQuery {
    fn default() -> Self {
        Self::new(None, 1, DEFAULT_CATALOG_LIMIT)
    }
}

/// A file attached to a catalog entry.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// MIME type; the server sniffs it when absent.
    pub mime: Option<String>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// Build a multipart form from a request's fields plus the file part.
///
/// Scalars become text parts; arrays repeat the field name once per item.
fn multipart_form<B: Serialize>(fields: &B, upload: FileUpload) -> Result<Form> {
    let mut form = Form::new();

    if let Value::Object(map) = serde_json::to_value(fields)? {
        for (key, value) in map {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        form = form.text(key.clone(), text_value(item));
                    }
                }
                other => form = form.text(key, text_value(other)),
            }
        }
    }

    let mut part = Part::bytes(upload.bytes).file_name(upload.file_name);
    if let Some(mime) = upload.mime {
        part = part
            .mime_str(&mime)
            .map_err(|e| Error::Config(format!("invalid MIME type '{}': {}", mime, e)))?;
    }
    Ok(form.part("file", part))
}

fn text_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Copy-machines API client.
pub struct CopyMachinesApi {
    client: ApiClient,
}

impl CopyMachinesApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Catalog of machine models.
    pub fn catalog(&self) -> CatalogApi {
        CatalogApi {
            client: self.client.clone(),
        }
    }

    /// Machines installed at client sites.
    pub fn installed(&self) -> InstalledApi {
        InstalledApi {
            client: self.client.clone(),
        }
    }

    /// Franchise plans.
    pub fn franchises(&self) -> FranchisesApi {
        FranchisesApi {
            client: self.client.clone(),
        }
    }

    /// Fleet-wide counters.
    pub async fn stats(&self) -> Result<CopyMachineStats> {
        self.client.get("copy-machines/stats").await
    }
}

/// Catalog endpoints (`/copy-machines/catalog`).
pub struct CatalogApi {
    client: ApiClient,
}

impl CatalogApi {
    /// One page of the catalog.
    pub async fn list(&self, query: &CatalogListQuery) -> Result<Paginated<CopyMachineCatalog>> {
        self.client
            .get_with_query("copy-machines/catalog", query)
            .await
    }

    pub async fn get(&self, id: EntityId) -> Result<CopyMachineCatalog> {
        self.client
            .get(&format!("copy-machines/catalog/{}", id))
            .await
    }

    pub async fn create(&self, request: &CreateCatalogRequest) -> Result<CopyMachineCatalog> {
        self.client.post("copy-machines/catalog", request).await
    }

    /// Create an entry with an image or brochure attached.
    pub async fn create_with_file(
        &self,
        request: &CreateCatalogRequest,
        upload: FileUpload,
    ) -> Result<CopyMachineCatalog> {
        let form = multipart_form(request, upload)?;
        self.client
            .post_multipart("copy-machines/catalog", form)
            .await
    }

    pub async fn update(
        &self,
        id: EntityId,
        request: &UpdateCatalogRequest,
    ) -> Result<CopyMachineCatalog> {
        self.client
            .patch(&format!("copy-machines/catalog/{}", id), request)
            .await
    }

    /// Update an entry and replace its attached file.
    pub async fn update_with_file(
        &self,
        id: EntityId,
        request: &UpdateCatalogRequest,
        upload: FileUpload,
    ) -> Result<CopyMachineCatalog> {
        let form = multipart_form(request, upload)?;
        self.client
            .patch_multipart(&format!("copy-machines/catalog/{}", id), form)
            .await
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        self.client
            .delete(&format!("copy-machines/catalog/{}", id))
            .await
    }
}

/// Installed-machine endpoints (`/copy-machines/client`).
pub struct InstalledApi {
    client: ApiClient,
}

impl InstalledApi {
    /// Machines installed at one client.
    pub async fn by_client(&self, client_id: EntityId) -> Result<Vec<ClientCopyMachine>> {
        self.client
            .get(&format!("copy-machines/client/by-client/{}", client_id))
            .await
    }

    pub async fn get(&self, id: EntityId) -> Result<ClientCopyMachine> {
        self.client
            .get(&format!("copy-machines/client/{}", id))
            .await
    }

    pub async fn create(
        &self,
        request: &CreateClientCopyMachineRequest,
    ) -> Result<ClientCopyMachine> {
        self.client.post("copy-machines/client", request).await
    }

    pub async fn update(
        &self,
        id: EntityId,
        request: &UpdateClientCopyMachineRequest,
    ) -> Result<ClientCopyMachine> {
        self.client
            .patch(&format!("copy-machines/client/{}", id), request)
            .await
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        self.client
            .delete(&format!("copy-machines/client/{}", id))
            .await
    }
}

/// Franchise endpoints (`/copy-machines/franchise`).
pub struct FranchisesApi {
    client: ApiClient,
}

impl FranchisesApi {
    pub async fn list(&self) -> Result<Vec<Franchise>> {
        self.client.get("copy-machines/franchise").await
    }

    pub async fn get(&self, id: EntityId) -> Result<Franchise> {
        self.client
            .get(&format!("copy-machines/franchise/{}", id))
            .await
    }

    pub async fn create(&self, request: &CreateFranchiseRequest) -> Result<Franchise> {
        self.client.post("copy-machines/franchise", request).await
    }

    pub async fn update(&self, id: EntityId, request: &UpdateFranchiseRequest) -> Result<Franchise> {
        self.client
            .patch(&format!("copy-machines/franchise/{}", id), request)
            .await
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        self.client
            .delete(&format!("copy-machines/franchise/{}", id))
            .await
    }
}
