//! Key casing for schema-less payloads.
//!
//! Typed bodies get their wire names from `serde` derives. Error bodies have
//! no schema, so their keys are rewritten here before callers see them.

use serde_json::{Map, Value};

/// Convert a `snake_case` (or `kebab-case`) key to `camelCase`.
///
/// Leading underscores and keys that are already camel-cased are kept as-is.
pub fn to_camel_case(key: &str) -> String {
    let prefix_len = key.len() - key.trim_start_matches('_').len();
    let (prefix, rest) = key.split_at(prefix_len);

    let mut out = String::with_capacity(key.len());
    out.push_str(prefix);

    let mut upper_next = false;
    for ch in rest.chars() {
        if ch == '_' || ch == '-' {
            upper_next = out.len() > prefix.len();
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Recursively camel-case every object key in `value`.
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (to_camel_case(&k), camelize_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        other => other,
    }
}
