//! Client-side state that outlives a single request.
//!
//! - [`Storage`] backends ([`MemoryStorage`], [`FileStorage`]) persist the
//!   token, the signed-in user and the theme preference
//! - [`SessionStore`] owns the signed-in identity and its lifecycle
//! - [`ThemeStore`] owns the light/dark preference
//! - [`require_auth`] guards pages that need a signed-in user
//! - [`Navigator`] abstracts "go to this page"
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use intersul_session::{FileStorage, SessionStore};
//!
//! let storage = Arc::new(FileStorage::in_dir(&data_dir));
//! let session = SessionStore::new(storage);
//! session.init()?;
//! ```

mod error;
mod guard;
mod navigator;
mod session;
mod storage;
mod theme;

pub use error::{Error, Result};
pub use guard::{GuardOutcome, LOGIN_PATH, login_redirect, require_auth};
pub use navigator::{Navigator, RecordingNavigator};
pub use session::{Session, SessionState, SessionStore};
pub use storage::{
    FileStorage, MemoryStorage, STORAGE_FILE, Storage, THEME_KEY, TOKEN_KEY, USER_KEY,
};
pub use theme::{
    ResolvedTheme, StaticAppearance, SystemAppearance, Theme, ThemeState, ThemeStore,
};
