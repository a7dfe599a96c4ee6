//! Validation errors.

use std::collections::BTreeMap;

use serde::Serialize;

/// Messages keyed by dotted field path (`"confirm_password"`,
/// `"features.0"`). Only one message is kept per path: a later failure on
/// the same path replaces an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("{}", summarize(.errors))]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

fn summarize(errors: &BTreeMap<String, String>) -> String {
    let parts: Vec<String> = errors
        .iter()
        .map(|(path, message)| {
            if path.is_empty() {
                message.clone()
            } else {
                format!("{}: {}", path, message)
            }
        })
        .collect();
    parts.join("; ")
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single error at `path`.
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(path, message);
        errors
    }

    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(path.into(), message.into());
    }

    /// Message for `field`, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.errors
    }
}

/// Outcome of validating a form.
pub type Validated<T> = std::result::Result<T, FieldErrors>;
