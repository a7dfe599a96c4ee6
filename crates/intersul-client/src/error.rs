//! Client error types.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::casing::camelize_keys;

/// Message carried by every failure where no response was received.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response (connect failure, timeout,
    /// dropped connection).
    #[error("{}", NETWORK_ERROR_MESSAGE)]
    Network {
        /// Underlying transport failure, for logs.
        detail: String,
    },

    /// The server rejected the credentials (HTTP 401).
    #[error("Unauthorized: {}", body.summary())]
    Unauthorized { body: ErrorBody },

    /// Server returned any other error response.
    #[error("API error ({status}): {}", body.summary())]
    Api {
        /// HTTP status code.
        status: u16,
        /// Normalized error body.
        body: ErrorBody,
    },

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn network(err: &reqwest::Error) -> Self {
        Error::Network {
            detail: err.to_string(),
        }
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unauthorized { .. } => Some(401),
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The normalized error body, if the server sent one.
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            Error::Unauthorized { body } | Error::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The camel-cased JSON error body (`error.response.data`).
    pub fn response_data(&self) -> Option<&Value> {
        self.body().and_then(|b| b.data.as_ref())
    }

    /// The server's message, joined when it sent a list.
    pub fn server_message(&self) -> Option<String> {
        self.body().and_then(|b| b.message())
    }

    /// Check if no response was received.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network { .. })
    }

    /// Check if this is an authentication error.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized { .. })
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if the server rejected the payload (400 or 422).
    pub fn is_validation(&self) -> bool {
        matches!(self.status(), Some(400) | Some(422))
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error response body, normalized.
///
/// The API answers with `{ "message": "..." | ["..."], "error": "...",
/// "status_code": 400, ... }`. Known fields are lifted out; the whole body is
/// also kept camel-cased in [`ErrorBody::data`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorBody {
    /// Messages, in server order. A single string arrives as one element.
    pub messages: Vec<String>,
    /// Short error label (e.g. `Bad Request`).
    pub error: Option<String>,
    /// Status code echoed in the body.
    pub status_code: Option<u16>,
    /// Remaining keys, camel-cased.
    pub details: Map<String, Value>,
    /// The complete body, camel-cased. `None` for non-JSON bodies.
    pub data: Option<Value>,
}

impl ErrorBody {
    /// Normalize a raw response body.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Self::from_value(value),
            Err(_) => {
                let text = String::from_utf8_lossy(bytes).trim().to_string();
                Self {
                    messages: if text.is_empty() { Vec::new() } else { vec![text] },
                    ..Default::default()
                }
            }
        }
    }

    /// Normalize a JSON body.
    pub fn from_value(value: Value) -> Self {
        let data = camelize_keys(value);
        let mut body = Self {
            data: Some(data.clone()),
            ..Default::default()
        };

        let mut map = match data {
            Value::Object(map) => map,
            Value::String(s) => {
                body.messages.push(s);
                return body;
            }
            _ => return body,
        };

        match map.remove("message") {
            Some(Value::String(s)) => body.messages.push(s),
            Some(Value::Array(items)) => {
                body.messages = items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect();
            }
            Some(other) if !other.is_null() => body.messages.push(other.to_string()),
            _ => {}
        }
        if let Some(Value::String(s)) = map.remove("error") {
            body.error = Some(s);
        }
        body.status_code = map
            .remove("statusCode")
            .and_then(|v| v.as_u64())
            .and_then(|n| u16::try_from(n).ok());
        body.details = map;
        body
    }

    /// Messages joined with `; `, if any.
    pub fn message(&self) -> Option<String> {
        if self.messages.is_empty() {
            None
        } else {
            Some(self.messages.join("; "))
        }
    }

    fn summary(&self) -> String {
        self.message()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "no details".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_with_message_list() {
        let body = ErrorBody::from_value(json!({
            "message": ["email must be an email", "name should not be empty"],
            "error": "Bad Request",
            "status_code": 400,
            "field_name": "email"
        }));

        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.error.as_deref(), Some("Bad Request"));
        assert_eq!(body.status_code, Some(400));
        assert_eq!(body.details.get("fieldName"), Some(&json!("email")));
        assert_eq!(
            body.data.as_ref().and_then(|d| d.get("statusCode")),
            Some(&json!(400))
        );
    }

    #[test]
    fn test_body_with_single_message() {
        let body = ErrorBody::from_value(json!({"message": "Client not found"}));
        assert_eq!(body.message().as_deref(), Some("Client not found"));
        assert!(body.details.is_empty());
    }

    #[test]
    fn test_non_json_body() {
        let body = ErrorBody::from_bytes(b"Bad Gateway");
        assert_eq!(body.message().as_deref(), Some("Bad Gateway"));
        assert!(body.data.is_none());

        let empty = ErrorBody::from_bytes(b"");
        assert!(empty.message().is_none());
    }

    #[test]
    fn test_error_predicates() {
        let not_found = Error::Api {
            status: 404,
            body: ErrorBody::default(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_server_error());

        let unprocessable = Error::Api {
            status: 422,
            body: ErrorBody::default(),
        };
        assert!(unprocessable.is_validation());

        let unauthorized = Error::Unauthorized {
            body: ErrorBody::default(),
        };
        assert!(unauthorized.is_unauthorized());
        assert_eq!(unauthorized.status(), Some(401));

        let network = Error::Network {
            detail: "connection refused".to_string(),
        };
        assert!(network.is_network());
        assert_eq!(network.to_string(), NETWORK_ERROR_MESSAGE);
        assert!(network.status().is_none());
    }
}
