//! Structural form validation.
//!
//! Forms are checked synchronously against a declarative [`Schema`]; failures
//! come back as [`FieldErrors`] keyed by dotted field path, ready to show
//! next to the offending inputs.
//!
//! ```rust
//! use intersul_forms::{schemas, validate};
//! use serde_json::json;
//!
//! let errors = validate::<serde_json::Value>(
//!     &schemas::register(),
//!     &json!({
//!         "name": "Ana",
//!         "email": "ana@intersul.com.br",
//!         "password": "secret1",
//!         "confirm_password": "secret2"
//!     }),
//! )
//! .unwrap_err();
//! assert_eq!(errors.get("confirm_password"), Some("Passwords don't match"));
//! ```

mod error;
mod schema;
pub mod schemas;

pub use error::{FieldErrors, Validated};
pub use schema::{Field, REQUIRED_MESSAGE, Schema, validate};
