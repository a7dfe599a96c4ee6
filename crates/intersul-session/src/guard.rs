//! Route guard for pages that need a signed-in user.

use crate::storage::{Storage, TOKEN_KEY};

/// Path of the login page.
pub const LOGIN_PATH: &str = "/login";

/// Outcome of [`require_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    /// Go here instead, then come back.
    Redirect(String),
}

/// Allow `path` only when a token is stored.
///
/// Only the presence of a token is checked; it is not verified.
pub fn require_auth(storage: &dyn Storage, path: &str) -> GuardOutcome {
    match storage.get(TOKEN_KEY) {
        Some(token) if !token.is_empty() => GuardOutcome::Allow,
        _ => GuardOutcome::Redirect(login_redirect(path)),
    }
}

/// The login URL that returns to `path` afterwards.
pub fn login_redirect(path: &str) -> String {
    format!("{}?redirectTo={}", LOGIN_PATH, urlencoding::encode(path))
}
