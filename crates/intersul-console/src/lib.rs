//! Application layer for the Intersul console.
//!
//! This crate ties the infrastructure crates together behind one
//! [`AppContext`]:
//!
//! - **Session and theme**: restored from storage at startup
//! - **Transport**: an [`ApiClient`](intersul_client::ApiClient) that reads its
//!   token from the session and signs out on a 401
//! - **Hooks**: cached, resource-scoped operations used by front ends
//!
//! # Example
//!
//! ```ignore
//! use intersul_console::AppContext;
//!
//! let ctx = AppContext::init(&config, storage, navigator, appearance)?;
//! let page = ctx.catalog().list(None, 1, 10).await?;
//! ```

mod context;
mod error;
pub mod hooks;

pub use context::{AppContext, SessionAuth};
pub use error::{
    ConsoleError, ErrorKind, Result, SERVER_MESSAGE, UNAUTHORIZED_MESSAGE, VALIDATION_MESSAGE,
};

// Re-export key types from infrastructure crates for convenience
pub use intersul_config::ConsoleConfig;
pub use intersul_forms::{FieldErrors, schemas};
pub use intersul_session::{
    FileStorage, MemoryStorage, Navigator, RecordingNavigator, Session, SessionState,
    StaticAppearance, Storage, SystemAppearance, Theme, ThemeState,
};
