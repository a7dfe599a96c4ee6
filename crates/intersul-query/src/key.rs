//! Query keys.
//!
//! A key is an ordered list of segments, e.g. `["copy-machines", "xerox", 1, 10]`.
//! Keys are related by prefix: `["clients"]` covers `["clients", 7]` and
//! `["clients", "stats"]`.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// One segment of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeySegment {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    /// Canonical JSON text of a structured parameter (e.g. list filters).
    Json(String),
}

impl KeySegment {
    /// Segment for a structured parameter.
    ///
    /// Object keys are sorted, so equal parameters always produce equal
    /// segments. Values that fail to serialize become `Null`.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(Value::Null) | Err(_) => KeySegment::Null,
            Ok(v) => KeySegment::Json(canonical(v).to_string()),
        }
    }
}

fn canonical(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonical(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonical).collect()),
        other => other,
    }
}

impl fmt::Display for KeySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySegment::Null => f.write_str("null"),
            KeySegment::Bool(b) => write!(f, "{}", b),
            KeySegment::Int(n) => write!(f, "{}", n),
            KeySegment::Str(s) => write!(f, "{:?}", s),
            KeySegment::Json(json) => f.write_str(json),
        }
    }
}

impl From<&str> for KeySegment {
    fn from(s: &str) -> Self {
        KeySegment::Str(s.to_string())
    }
}

impl From<String> for KeySegment {
    fn from(s: String) -> Self {
        KeySegment::Str(s)
    }
}

impl From<&String> for KeySegment {
    fn from(s: &String) -> Self {
        KeySegment::Str(s.clone())
    }
}

impl From<bool> for KeySegment {
    fn from(b: bool) -> Self {
        KeySegment::Bool(b)
    }
}

macro_rules! int_segment {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for KeySegment {
                fn from(n: $ty) -> Self {
                    KeySegment::Int(i64::from(n))
                }
            }
        )+
    };
}

int_segment!(i32, i64, u32, u16, u8);

impl<T: Into<KeySegment>> From<Option<T>> for KeySegment {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(KeySegment::Null)
    }
}

/// Ordered cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    pub fn new(segments: Vec<KeySegment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `prefix` covers this key. The empty key covers everything.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// A copy of this key with one more segment.
    pub fn child(&self, segment: impl Into<KeySegment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", segment)?;
        }
        f.write_str("]")
    }
}

impl From<Vec<KeySegment>> for QueryKey {
    fn from(segments: Vec<KeySegment>) -> Self {
        Self(segments)
    }
}

/// Build a [`QueryKey`] from segments convertible into [`KeySegment`].
///
/// ```
/// use intersul_query::query_key;
///
/// let key = query_key!["copy-machines", Some("xerox"), 1u32, 10u32];
/// assert_eq!(key.to_string(), r#"["copy-machines","xerox",1,10]"#);
/// ```
#[macro_export]
macro_rules! query_key {
    ($($segment:expr),* $(,)?) => {
        $crate::QueryKey::new(vec![$($crate::KeySegment::from($segment)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_key;

    #[test]
    fn test_prefix_relation() {
        let list = query_key!["copy-machines", None::<&str>, 1u32, 10u32];
        let prefix = query_key!["copy-machines"];
        let detail = query_key!["copy-machine", 4i64];

        assert!(list.starts_with(&prefix));
        assert!(!detail.starts_with(&prefix));
        assert!(prefix.starts_with(&prefix));
        assert!(detail.starts_with(&QueryKey::default()));
    }

    #[test]
    fn test_option_segments() {
        assert_eq!(KeySegment::from(None::<String>), KeySegment::Null);
        assert_eq!(
            KeySegment::from(Some("x")),
            KeySegment::Str("x".to_string())
        );
    }

    #[test]
    fn test_json_segment_is_canonical() {
        #[derive(Serialize)]
        struct A {
            page: u32,
            search: &'static str,
        }
        #[derive(Serialize)]
        struct B {
            search: &'static str,
            page: u32,
        }

        assert_eq!(
            KeySegment::json(&A { page: 1, search: "x" }),
            KeySegment::json(&B { search: "x", page: 1 })
        );
        assert_eq!(KeySegment::json(&None::<u8>), KeySegment::Null);
    }

    #[test]
    fn test_display_and_child() {
        let key = query_key!["clients"].child("stats");
        assert_eq!(key.to_string(), r#"["clients","stats"]"#);
        assert_eq!(key.len(), 2);
    }
}
