//! HTTP client SDK for the Intersul field-service API.
//!
//! This crate provides a typed client for the remote REST API: one transport
//! ([`ApiClient`]) plus one resource proxy per entity.
//!
//! # Example
//!
//! ```no_run
//! use intersul_client::{ApiClient, Result};
//! use intersul_types::{ClientQuery, LoginRequest};
//!
//! # async fn example() -> Result<()> {
//! let client = ApiClient::builder()
//!     .base_url("http://localhost:3000")
//!     .build()?;
//!
//! let login = client
//!     .auth()
//!     .login(&LoginRequest {
//!         email: "ana@intersul.com.br".to_string(),
//!         password: "secret".to_string(),
//!     })
//!     .await?;
//!
//! let clients = client.clients().list(&ClientQuery::default()).await?;
//! println!("{} clients", clients.len());
//! # let _ = login;
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Every call fails with one of three shapes: [`Error::Network`] when no
//! response arrived, [`Error::Unauthorized`] for a 401 (after
//! [`AuthHooks::on_unauthorized`] ran), and [`Error::Api`] otherwise. The
//! server's error body is available via [`Error::response_data`].

pub mod api;
pub mod casing;
pub mod client;
pub mod error;

pub use api::{CatalogListQuery, FileUpload, RefreshResponse};
pub use client::{ApiClient, AuthHooks, ClientBuilder, DEFAULT_TIMEOUT, NoAuth, StaticToken};
pub use error::{Error, ErrorBody, NETWORK_ERROR_MESSAGE, Result};
