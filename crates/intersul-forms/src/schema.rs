//! Declarative form schemas.
//!
//! A [`Schema`] is an ordered set of named [`Field`]s plus cross-field
//! refinements. Checking an input:
//!
//! - reports every failing field under its dotted path;
//! - keeps only declared fields in the output (unknown keys are dropped);
//! - treats `null` like an absent value for optional fields;
//! - runs refinements only once every field passed.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{FieldErrors, Validated};

/// Message for a missing required field.
pub const REQUIRED_MESSAGE: &str = "Required";

type Check = Arc<dyn Fn(&Map<String, Value>) -> bool + Send + Sync>;

#[derive(Clone)]
struct Refinement {
    check: Check,
    path: String,
    message: String,
}

/// Named fields plus cross-field checks.
#[derive(Clone, Default)]
pub struct Schema {
    fields: Vec<(String, Field)>,
    refinements: Vec<Refinement>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.fields)
            .field("refinements", &self.refinements.len())
            .finish()
    }
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any field with the same name.
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = field,
            None => self.fields.push((name, field)),
        }
        self
    }

    /// Add a cross-field check. When `check` fails, `message` is reported
    /// at `path`.
    pub fn refine<F>(mut self, check: F, path: impl Into<String>, message: impl Into<String>) -> Self
    where
        F: Fn(&Map<String, Value>) -> bool + Send + Sync + 'static,
    {
        self.refinements.push(Refinement {
            check: Arc::new(check),
            path: path.into(),
            message: message.into(),
        });
        self
    }

    /// The same schema with every field optional.
    pub fn partial(&self) -> Self {
        let mut schema = self.clone();
        for (_, field) in &mut schema.fields {
            field.optional = true;
        }
        schema
    }

    /// This schema plus the fields and refinements of `other`. Fields of
    /// `other` win on name clashes.
    pub fn extend(&self, other: Schema) -> Self {
        let mut schema = self.clone();
        for (name, field) in other.fields {
            schema = schema.field(name, field);
        }
        schema.refinements.extend(other.refinements);
        schema
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Check `input` and return it with undeclared keys removed.
    pub fn check(&self, input: &Value) -> Validated<Value> {
        let mut errors = FieldErrors::new();
        let output = self.check_at("", input, &mut errors);
        match output {
            Some(value) if errors.is_empty() => Ok(value),
            _ => Err(errors),
        }
    }

    fn check_at(&self, prefix: &str, input: &Value, errors: &mut FieldErrors) -> Option<Value> {
        let Value::Object(object) = input else {
            errors.insert(prefix, type_message("object", input));
            return None;
        };

        let before = errors.len();
        let mut output = Map::new();
        for (name, field) in &self.fields {
            let path = join(prefix, name);
            if let Some(value) = field.check_at(&path, object.get(name), errors) {
                output.insert(name.clone(), value);
            }
        }

        if errors.len() > before {
            return None;
        }

        for refinement in &self.refinements {
            if !(refinement.check)(&output) {
                errors.insert(join(prefix, &refinement.path), refinement.message.clone());
            }
        }
        if errors.len() > before {
            return None;
        }

        Some(Value::Object(output))
    }
}

/// Validate `input` against `schema` and decode it into `T`.
///
/// A decode failure after a successful check (e.g. a fractional number for
/// an integer field) is reported at the empty path.
pub fn validate<T: DeserializeOwned>(schema: &Schema, input: &Value) -> Validated<T> {
    let data = schema.check(input)?;
    serde_json::from_value(data).map_err(|e| FieldErrors::single("", e.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Fields
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Kind {
    String,
    Number,
    Boolean,
    Array(Box<Field>),
    Object(Box<Schema>),
    Enum(Vec<String>),
}

#[derive(Debug, Clone)]
enum Rule {
    MinLen(usize, String),
    MaxLen(usize, String),
    Min(f64, String),
    Max(f64, String),
    Email(String),
    Url(String),
    /// `None` when the pattern failed to compile; such a rule never passes.
    Pattern(Option<Regex>, String),
}

/// One field of a [`Schema`].
#[derive(Debug, Clone)]
pub struct Field {
    kind: Kind,
    optional: bool,
    rules: Vec<Rule>,
}

impl Field {
    fn of(kind: Kind) -> Self {
        Self {
            kind,
            optional: false,
            rules: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::of(Kind::String)
    }

    pub fn number() -> Self {
        Self::of(Kind::Number)
    }

    pub fn boolean() -> Self {
        Self::of(Kind::Boolean)
    }

    pub fn array(item: Field) -> Self {
        Self::of(Kind::Array(Box::new(item)))
    }

    pub fn object(schema: Schema) -> Self {
        Self::of(Kind::Object(Box::new(schema)))
    }

    /// A string restricted to `values`.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of(Kind::Enum(values.into_iter().map(Into::into).collect()))
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Minimum length of a string (in characters) or an array.
    pub fn min_len(mut self, len: usize, message: impl Into<String>) -> Self {
        self.rules.push(Rule::MinLen(len, message.into()));
        self
    }

    /// Maximum length of a string (in characters) or an array.
    pub fn max_len(mut self, len: usize, message: impl Into<String>) -> Self {
        self.rules.push(Rule::MaxLen(len, message.into()));
        self
    }

    pub fn min(mut self, value: f64, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Min(value, message.into()));
        self
    }

    pub fn max(mut self, value: f64, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Max(value, message.into()));
        self
    }

    pub fn email(mut self, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Email(message.into()));
        self
    }

    pub fn url(mut self, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Url(message.into()));
        self
    }

    /// The string must match `pattern`.
    ///
    /// An invalid pattern is logged and makes the field always fail.
    pub fn pattern(mut self, pattern: &str, message: impl Into<String>) -> Self {
        let regex = Regex::new(pattern)
            .map_err(|e| {
                warn!(pattern = %pattern, error = %e, "invalid field pattern, field will never validate");
                e
            })
            .ok();
        self.rules.push(Rule::Pattern(regex, message.into()));
        self
    }

    fn check_at(&self, path: &str, value: Option<&Value>, errors: &mut FieldErrors) -> Option<Value> {
        let value = match value {
            None if self.optional => return None,
            None => {
                errors.insert(path, REQUIRED_MESSAGE);
                return None;
            }
            Some(Value::Null) if self.optional => return None,
            Some(value) => value,
        };

        match &self.kind {
            Kind::String => {
                let Some(text) = value.as_str() else {
                    errors.insert(path, type_message("string", value));
                    return None;
                };
                self.apply_rules(path, &Measured::Text(text), errors);
            }
            Kind::Number => {
                let Some(number) = value.as_f64() else {
                    errors.insert(path, type_message("number", value));
                    return None;
                };
                self.apply_rules(path, &Measured::Number(number), errors);
            }
            Kind::Boolean => {
                if !value.is_boolean() {
                    errors.insert(path, type_message("boolean", value));
                    return None;
                }
            }
            Kind::Array(item) => {
                let Some(items) = value.as_array() else {
                    errors.insert(path, type_message("array", value));
                    return None;
                };
                self.apply_rules(path, &Measured::Items(items.len()), errors);
                let checked: Vec<Value> = items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| item.check_at(&join(path, &i.to_string()), Some(v), errors))
                    .collect();
                return Some(Value::Array(checked));
            }
            Kind::Object(schema) => return schema.check_at(path, value, errors),
            Kind::Enum(values) => {
                let accepted = value.as_str().is_some_and(|s| values.iter().any(|v| v == s));
                if !accepted {
                    errors.insert(path, enum_message(values, value));
                    return None;
                }
            }
        }

        Some(value.clone())
    }

    fn apply_rules(&self, path: &str, measured: &Measured<'_>, errors: &mut FieldErrors) {
        for rule in &self.rules {
            let (passes, message) = match (rule, measured) {
                (Rule::MinLen(len, m), Measured::Text(s)) => (s.chars().count() >= *len, m),
                (Rule::MaxLen(len, m), Measured::Text(s)) => (s.chars().count() <= *len, m),
                (Rule::MinLen(len, m), Measured::Items(n)) => (n >= len, m),
                (Rule::MaxLen(len, m), Measured::Items(n)) => (n <= len, m),
                (Rule::Min(min, m), Measured::Number(n)) => (n >= min, m),
                (Rule::Max(max, m), Measured::Number(n)) => (n <= max, m),
                (Rule::Email(m), Measured::Text(s)) => (is_email(s), m),
                (Rule::Url(m), Measured::Text(s)) => (url::Url::parse(s).is_ok(), m),
                (Rule::Pattern(regex, m), Measured::Text(s)) => {
                    (regex.as_ref().is_some_and(|r| r.is_match(s)), m)
                }
                _ => continue,
            };
            if !passes {
                errors.insert(path, message.clone());
            }
        }
    }
}

enum Measured<'a> {
    Text(&'a str),
    Number(f64),
    Items(usize),
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_message(expected: &str, received: &Value) -> String {
    format!("Expected {}, received {}", expected, type_name(received))
}

fn enum_message(values: &[String], received: &Value) -> String {
    let expected: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
    let received = match received {
        Value::String(s) => format!("'{}'", s),
        other => type_name(other).to_string(),
    };
    format!(
        "Invalid enum value. Expected {}, received {}",
        expected.join(" | "),
        received
    )
}

fn is_email(candidate: &str) -> bool {
    let Some((local, domain)) = candidate.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.starts_with('.') || candidate.contains("..") {
        return false;
    }
    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_'+-.".contains(c))
        && !local.ends_with(['.', '\'']);

    let labels: Vec<&str> = domain.split('.').collect();
    let Some((tld, hosts)) = labels.split_last() else {
        return false;
    };
    let domain_ok = !hosts.is_empty()
        && hosts.iter().all(|label| {
            label.starts_with(|c: char| c.is_ascii_alphanumeric())
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic());

    local_ok && domain_ok
}
