//! API endpoint implementations.

mod auth;
mod categories;
mod clients;
mod copy_machines;
mod services;
mod users;

pub use auth::{AuthApi, RefreshResponse};
pub use categories::CategoriesApi;
pub use clients::ClientsApi;
pub use copy_machines::{
    CatalogApi, CatalogListQuery, CopyMachinesApi, FileUpload, FranchisesApi, InstalledApi,
};
pub use services::ServicesApi;
pub use users::UsersApi;
